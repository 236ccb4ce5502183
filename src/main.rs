use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use plume::config::Config;
use plume::generation::{GenerationClient, GenerationOptions, GenerationOrchestrator, OrchestratorConfig};
use plume::models::{Keyword, SiteCredentials, SitePlatform, Trend};
use plume::publish::{PublicationCoordinator, PublishMode, SiteApiClient};
use plume::scheduler::SchedulingAssigner;
use plume::server::{AppState, EngineServer, ServerConfig};
use plume::storage::{hydrate_workspace, ContentRepository, SiteRepository, SqliteStore};

#[derive(Parser)]
#[command(
    name = "plume",
    version,
    about = "SEO content scheduling and publication engine",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Workspace id (defaults to the single local workspace)
    #[arg(long, global = true)]
    workspace: Option<Uuid>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan accepted keywords onto the calendar
    Plan {
        /// Keywords in priority order
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// Days between placements
        #[arg(long)]
        spacing: Option<u32>,
    },

    /// Generate (or retry) content for a scheduled item
    Generate {
        /// Content item id
        item_id: Uuid,

        /// Writing tone
        #[arg(long, default_value = "professional")]
        tone: String,

        /// Target article length in words
        #[arg(long, default_value = "1500")]
        length: u32,

        /// Skip FAQ generation
        #[arg(long, default_value = "false")]
        no_faq: bool,
    },

    /// Test and connect a publication site
    Connect {
        /// Platform (wordpress, webflow, framer)
        platform: String,

        /// Site URL
        url: String,

        /// API username
        #[arg(short, long)]
        username: String,

        /// API secret
        #[arg(short, long)]
        secret: String,
    },

    /// Publish a drafted item to a connected site
    Publish {
        /// Content item id
        item_id: Uuid,

        /// Target site id
        site_id: Uuid,

        /// Publish mode (draft, publish)
        #[arg(short, long, default_value = "publish")]
        mode: String,
    },

    /// Move an item to another calendar date
    Reschedule {
        /// Content item id
        item_id: Uuid,

        /// Current date (YYYY-MM-DD)
        from: NaiveDate,

        /// Target date (YYYY-MM-DD)
        to: NaiveDate,
    },

    /// Run the engine API server
    Serve {
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = Config::from_env()?;
    config.validate()?;

    let workspace_id = cli.workspace.unwrap_or_else(Uuid::nil);

    match cli.command {
        Commands::Plan {
            keywords,
            start,
            spacing,
        } => {
            plan(&config, workspace_id, keywords, start, spacing).await?;
        }

        Commands::Generate {
            item_id,
            tone,
            length,
            no_faq,
        } => {
            generate(&config, workspace_id, item_id, tone, length, !no_faq).await?;
        }

        Commands::Connect {
            platform,
            url,
            username,
            secret,
        } => {
            connect(&config, workspace_id, platform, url, username, secret).await?;
        }

        Commands::Publish {
            item_id,
            site_id,
            mode,
        } => {
            publish(&config, workspace_id, item_id, site_id, mode).await?;
        }

        Commands::Reschedule { item_id, from, to } => {
            reschedule(&config, workspace_id, item_id, from, to).await?;
        }

        Commands::Serve { bind } => {
            serve(&config, workspace_id, bind).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("plume=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("plume=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn open_workspace(
    config: &Config,
    workspace_id: Uuid,
) -> Result<(Arc<plume::workspace::Workspace>, Arc<SqliteStore>)> {
    let store = Arc::new(SqliteStore::new(&config.database.sqlite_path)?);
    let workspace = hydrate_workspace(workspace_id, store.as_ref(), store.as_ref()).await?;
    Ok((Arc::new(workspace), store))
}

async fn plan(
    config: &Config,
    workspace_id: Uuid,
    keyword_texts: Vec<String>,
    start: Option<NaiveDate>,
    spacing: Option<u32>,
) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let mut assigner_config = config.assigner_config();
    if let Some(days) = spacing {
        assigner_config = assigner_config.with_spacing_days(days);
    }
    let assigner = SchedulingAssigner::with_config(assigner_config)?;

    let keywords: Vec<Keyword> = keyword_texts
        .iter()
        .map(|text| Keyword::new(text, 0, 0, Trend::Flat))
        .collect::<std::result::Result<_, _>>()?;

    let start_date = start.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let items = workspace.plan(&assigner, &keywords, start_date).await?;

    for item in &items {
        store.save_item(workspace_id, item).await?;
        println!(
            "{}  {}  [{}]  {}",
            item.scheduled_date, item.id, item.status, item.title
        );
    }

    Ok(())
}

async fn generate(
    config: &Config,
    workspace_id: Uuid,
    item_id: Uuid,
    tone: String,
    length: u32,
    include_faq: bool,
) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let client = GenerationClient::with_config(config.generation_config())?;
    let orchestrator = GenerationOrchestrator::with_config(
        workspace.clone(),
        client,
        OrchestratorConfig::default().with_timeout_secs(config.generation.timeout_secs),
    );

    let options = GenerationOptions {
        tone,
        target_length: length,
        include_images: false,
        include_faq,
    };

    let outcome = orchestrator.generate(item_id, &options).await;

    // The terminal state is persisted either way.
    if let Some(item) = workspace.item(item_id).await {
        store.save_item(workspace_id, &item).await?;
        println!("{}  [{}]  {}", item.id, item.status, item.title);
        if let Some(reason) = &item.failure_reason {
            println!("  failure: {reason}");
        }
    }

    outcome.map_err(Into::into)
}

async fn connect(
    config: &Config,
    workspace_id: Uuid,
    platform: String,
    url: String,
    username: String,
    secret: String,
) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let platform = SitePlatform::parse(&platform)
        .ok_or_else(|| anyhow::anyhow!("unknown platform: {platform}"))?;
    let credentials = SiteCredentials {
        url,
        username,
        secret,
    };

    let client = SiteApiClient::with_config(config.site_client_config())?;
    let coordinator = PublicationCoordinator::new(workspace.clone(), client);

    let check = coordinator.test_connection(&credentials).await?;
    if !check.success {
        anyhow::bail!(
            "connection test failed: {}",
            check.error.as_deref().unwrap_or("unknown reason")
        );
    }

    let site = coordinator.connect(platform, credentials).await?;
    store.save_site(workspace_id, &site).await?;
    println!("connected {} ({}) as {}", site.url, site.platform, site.id);

    Ok(())
}

async fn publish(
    config: &Config,
    workspace_id: Uuid,
    item_id: Uuid,
    site_id: Uuid,
    mode: String,
) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let mode =
        PublishMode::parse(&mode).ok_or_else(|| anyhow::anyhow!("unknown publish mode: {mode}"))?;

    let client = SiteApiClient::with_config(config.site_client_config())?;
    let coordinator = PublicationCoordinator::new(workspace.clone(), client);

    let outcome = coordinator.publish(item_id, site_id, mode).await;

    if let Some(item) = workspace.item(item_id).await {
        store.save_item(workspace_id, &item).await?;
        println!("{}  [{}]  {}", item.id, item.status, item.title);
        if let Some(url) = &item.published_url {
            println!("  live at: {url}");
        }
        if let Some(reason) = &item.failure_reason {
            println!("  failure: {reason}");
        }
    }

    outcome.map(|_| ()).map_err(Into::into)
}

async fn reschedule(
    config: &Config,
    workspace_id: Uuid,
    item_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let item = workspace.reschedule(item_id, from, to).await?;
    store.save_item(workspace_id, &item).await?;
    println!("{} moved to {}", item.id, item.scheduled_date);

    Ok(())
}

async fn serve(config: &Config, workspace_id: Uuid, bind: String) -> Result<()> {
    let (workspace, store) = open_workspace(config, workspace_id).await?;

    let server_config = ServerConfig::builder().bind_address_str(&bind)?.build();
    let state = AppState::with_workspace(config, workspace.clone())?;
    let server = EngineServer::new(server_config, state);

    println!("{}", server.info().display());

    server
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    // Session teardown: persist the workspace state accumulated while serving.
    let items = workspace.items().await;
    futures::future::try_join_all(
        items
            .iter()
            .map(|item| store.save_item(workspace_id, item)),
    )
    .await?;
    let sites = workspace.sites().await;
    futures::future::try_join_all(
        sites
            .iter()
            .map(|site| store.save_site(workspace_id, site)),
    )
    .await?;
    tracing::info!("workspace {} persisted", workspace_id);

    Ok(())
}
