//! Shared helpers for integration tests

use chrono::NaiveDate;
use plume::models::{Keyword, Trend};
use serde_json::json;

/// Build a keyword with advisory metadata filled in
pub fn keyword(text: &str) -> Keyword {
    Keyword::new(text, 1000, 40, Trend::Up).unwrap()
}

/// Build keywords in priority order
pub fn keywords(texts: &[&str]) -> Vec<Keyword> {
    texts.iter().map(|t| keyword(t)).collect()
}

/// January 2025 date shorthand
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

/// A well-formed generation service response body
pub fn generation_response(keyword: &str) -> serde_json::Value {
    json!({
        "title": format!("The Complete Guide to {keyword}"),
        "slug": format!("guide-to-{}", keyword.replace(' ', "-")),
        "content": format!("Everything you need to know about {keyword}."),
        "meta_title": format!("{keyword} Guide"),
        "meta_description": format!("A practical guide to {keyword}."),
        "faq": [
            { "question": format!("What is {keyword}?"), "answer": "An SEO practice." }
        ],
        "word_count": 1500
    })
}
