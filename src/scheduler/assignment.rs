//! Initial calendar placement for accepted keywords
//!
//! Given an ordered list of accepted keywords (order = priority), the
//! assigner produces one content item per keyword and computes its calendar
//! date using a fixed spacing policy. The first item starts generating
//! immediately so the user sees progress; the rest queue up as scheduled.

use chrono::{Duration, NaiveDate};

use crate::models::{ContentItem, ContentType, Keyword};

use super::calendar::CalendarIndex;
use super::error::{SchedulerError, SchedulerResult};

/// Default gap between consecutive placements, in days
pub const DEFAULT_SPACING_DAYS: u32 = 3;

// ============================================================================
// Assigner Configuration
// ============================================================================

/// Spacing policy for initial placements
///
/// The per-day cap and the horizon default to unlimited, matching the
/// observed product behavior; both are policy knobs rather than constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignerConfig {
    /// Days between consecutive placements
    pub spacing_days: u32,

    /// Maximum items allowed on a single date (None = unlimited)
    pub max_per_day: Option<usize>,

    /// Furthest placement allowed, in days from the start date
    /// (None = unlimited)
    pub horizon_days: Option<u32>,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            spacing_days: DEFAULT_SPACING_DAYS,
            max_per_day: None,
            horizon_days: None,
        }
    }
}

impl AssignerConfig {
    /// Set spacing between placements
    pub fn with_spacing_days(mut self, days: u32) -> Self {
        self.spacing_days = days;
        self
    }

    /// Cap the number of items per date
    pub fn with_max_per_day(mut self, max: usize) -> Self {
        self.max_per_day = Some(max);
        self
    }

    /// Bound how far ahead placements may land
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = Some(days);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.spacing_days == 0 {
            return Err(SchedulerError::invalid_config(
                "spacing_days",
                "must be at least 1",
            ));
        }
        if self.max_per_day == Some(0) {
            return Err(SchedulerError::invalid_config(
                "max_per_day",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Scheduling Assigner
// ============================================================================

/// Computes initial calendar placements for accepted keywords
#[derive(Debug, Clone, Default)]
pub struct SchedulingAssigner {
    config: AssignerConfig,
}

impl SchedulingAssigner {
    /// Create an assigner with the default spacing policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assigner with a custom policy
    pub fn with_config(config: AssignerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the active configuration
    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    /// Build one content item per keyword, spaced across the calendar
    ///
    /// The first keyword lands on `start_date`, each subsequent one on
    /// `previous + spacing_days`. Dates that already hold items get appends
    /// unless a per-day cap is configured, in which case the placement
    /// slides forward day by day until a date with capacity is found. The
    /// first item enters `Generating`; all others stay `Scheduled`.
    ///
    /// `calendar` is read to honor the cap but not mutated; the caller
    /// places the returned items under its own lock.
    pub fn plan(
        &self,
        keywords: &[Keyword],
        start_date: NaiveDate,
        calendar: &CalendarIndex,
    ) -> SchedulerResult<Vec<ContentItem>> {
        if keywords.is_empty() {
            return Err(SchedulerError::EmptyPlan);
        }

        let types = ContentType::all();
        let mut items = Vec::with_capacity(keywords.len());
        let mut planned_per_day: std::collections::HashMap<NaiveDate, usize> =
            std::collections::HashMap::new();
        let mut cursor = start_date;

        for (index, keyword) in keywords.iter().enumerate() {
            let date = self.next_date_with_capacity(cursor, calendar, &planned_per_day)?;
            self.check_horizon(start_date, date)?;

            let content_type = types[index % types.len()];
            let mut item = ContentItem::new(
                title_for(keyword, content_type),
                keyword.clone(),
                content_type,
                date,
            );
            if index == 0 {
                item.begin_generation()
                    .expect("fresh items are always Scheduled");
            }

            *planned_per_day.entry(date).or_insert(0) += 1;
            items.push(item);
            cursor = date + Duration::days(i64::from(self.config.spacing_days));
        }

        tracing::debug!(
            keywords = keywords.len(),
            start = %start_date,
            spacing = self.config.spacing_days,
            "planned initial placements"
        );

        Ok(items)
    }

    /// Slide forward from `date` until a day with capacity is found
    fn next_date_with_capacity(
        &self,
        date: NaiveDate,
        calendar: &CalendarIndex,
        planned: &std::collections::HashMap<NaiveDate, usize>,
    ) -> SchedulerResult<NaiveDate> {
        let Some(cap) = self.config.max_per_day else {
            return Ok(date);
        };

        let mut candidate = date;
        loop {
            let occupied = calendar.items_on(candidate).len()
                + planned.get(&candidate).copied().unwrap_or(0);
            if occupied < cap {
                return Ok(candidate);
            }
            candidate = candidate + Duration::days(1);
        }
    }

    fn check_horizon(&self, start: NaiveDate, date: NaiveDate) -> SchedulerResult<()> {
        if let Some(horizon) = self.config.horizon_days {
            if (date - start).num_days() > i64::from(horizon) {
                return Err(SchedulerError::HorizonExceeded {
                    date,
                    horizon_days: horizon,
                });
            }
        }
        Ok(())
    }
}

/// Derive a working title from the keyword and content type
fn title_for(keyword: &Keyword, content_type: ContentType) -> String {
    let topic = title_case(&keyword.text);
    match content_type {
        ContentType::Guide => format!("The Complete Guide to {topic}"),
        ContentType::HowTo => format!("How to Get Results with {topic}"),
        ContentType::List => format!("10 Proven {topic} Strategies"),
        ContentType::Explainer => format!("{topic} Explained"),
        ContentType::Tutorial => format!("{topic}: A Step-by-Step Tutorial"),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentStatus, Trend};

    fn keywords(texts: &[&str]) -> Vec<Keyword> {
        texts
            .iter()
            .map(|t| Keyword::new(*t, 500, 30, Trend::Flat).unwrap())
            .collect()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_default_spacing_placement() {
        let assigner = SchedulingAssigner::new();
        let items = assigner
            .plan(
                &keywords(&["seo local", "content marketing", "backlinks"]),
                date(1),
                &CalendarIndex::new(),
            )
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].scheduled_date, date(1));
        assert_eq!(items[1].scheduled_date, date(4));
        assert_eq!(items[2].scheduled_date, date(7));

        assert_eq!(items[0].status, ContentStatus::Generating);
        assert_eq!(items[1].status, ContentStatus::Scheduled);
        assert_eq!(items[2].status, ContentStatus::Scheduled);
    }

    #[test]
    fn test_content_type_rotation() {
        let assigner = SchedulingAssigner::new();
        let items = assigner
            .plan(
                &keywords(&["a", "b", "c", "d", "e", "f"]),
                date(1),
                &CalendarIndex::new(),
            )
            .unwrap();

        let types: Vec<_> = items.iter().map(|i| i.content_type).collect();
        assert_eq!(types[0], ContentType::Guide);
        assert_eq!(types[4], ContentType::Tutorial);
        // Sixth keyword wraps back to the first type
        assert_eq!(types[5], ContentType::Guide);
    }

    #[test]
    fn test_occupied_date_gets_append_without_cap() {
        let mut calendar = CalendarIndex::new();
        calendar.place(uuid::Uuid::new_v4(), date(1)).unwrap();

        let assigner = SchedulingAssigner::new();
        let items = assigner
            .plan(&keywords(&["seo local"]), date(1), &calendar)
            .unwrap();

        // No shifting: the bucket simply grows
        assert_eq!(items[0].scheduled_date, date(1));
    }

    #[test]
    fn test_per_day_cap_slides_placement() {
        let mut calendar = CalendarIndex::new();
        calendar.place(uuid::Uuid::new_v4(), date(1)).unwrap();

        let assigner = SchedulingAssigner::with_config(
            AssignerConfig::default().with_max_per_day(1),
        )
        .unwrap();

        let items = assigner
            .plan(&keywords(&["seo local"]), date(1), &calendar)
            .unwrap();
        assert_eq!(items[0].scheduled_date, date(2));
    }

    #[test]
    fn test_horizon_enforced() {
        let assigner = SchedulingAssigner::with_config(
            AssignerConfig::default().with_horizon_days(4),
        )
        .unwrap();

        let err = assigner
            .plan(&keywords(&["a", "b", "c"]), date(1), &CalendarIndex::new())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::HorizonExceeded { .. }));
    }

    #[test]
    fn test_empty_keyword_list_rejected() {
        let assigner = SchedulingAssigner::new();
        let err = assigner
            .plan(&[], date(1), &CalendarIndex::new())
            .unwrap_err();
        assert_eq!(err, SchedulerError::EmptyPlan);
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let err = SchedulingAssigner::with_config(
            AssignerConfig::default().with_spacing_days(0),
        )
        .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidConfig { .. }));
    }

    #[test]
    fn test_titles_reflect_keyword() {
        let assigner = SchedulingAssigner::new();
        let items = assigner
            .plan(&keywords(&["seo local"]), date(1), &CalendarIndex::new())
            .unwrap();
        assert_eq!(items[0].title, "The Complete Guide to Seo Local");
    }
}
