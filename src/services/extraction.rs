//! Recovers a [`MarketReport`] from free-form service output.
//!
//! The service is asked for a fenced JSON block followed by a narrative, but
//! nothing enforces that. Extraction is total: when the block is missing or
//! unparseable a placeholder report is synthesized that carries the whole raw
//! text as its narrative.

use crate::models::{MarketReport, MarketSentiment, RawResponse};
use crate::services::prompt::{FENCE, JSON_FENCE_OPEN};
use chrono::{Local, NaiveDate};
use std::fmt;

/// Marker written into description fields of a synthesized report.
pub const PARSE_FAILED_MARKER: &str = "parse failed";
/// Turnover shown when no figures could be recovered.
pub const UNAVAILABLE_MARKER: &str = "unavailable";
/// Narrative used when nothing follows the JSON block.
pub const NO_NARRATIVE_PLACEHOLDER: &str = "no narrative available";

/// Why the structured path was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NoJsonBlock,
    InvalidJson(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoJsonBlock => write!(f, "no fenced json block"),
            Self::InvalidJson(detail) => write!(f, "invalid json block: {detail}"),
        }
    }
}

/// Result of one extraction. `report.summary` always equals `narrative`.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub report: MarketReport,
    pub narrative: String,
    /// Set when the report is a synthesized placeholder.
    pub fallback: Option<FallbackReason>,
}

impl Extraction {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

struct JsonBlock<'a> {
    body: &'a str,
    /// Byte offset just past the closing fence.
    end: usize,
}

pub struct ResponseExtractor;

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts using today's local date for any synthesized report.
    pub fn extract(&self, raw: &RawResponse) -> Extraction {
        self.extract_on(raw, Local::now().date_naive())
    }

    pub fn extract_on(&self, raw: &RawResponse, today: NaiveDate) -> Extraction {
        let text = raw.text.as_str();
        let Some(block) = locate_json_block(text) else {
            tracing::debug!("response has no json block, synthesizing report");
            return fallback(text, today, FallbackReason::NoJsonBlock);
        };

        let cleaned = block.body.replace("\\n", "");
        match serde_json::from_str::<MarketReport>(&cleaned) {
            Ok(mut report) => {
                let remainder = text[block.end..].trim();
                let narrative = if remainder.is_empty() {
                    NO_NARRATIVE_PLACEHOLDER.to_string()
                } else {
                    remainder.to_string()
                };
                report.summary = narrative.clone();
                Extraction {
                    report,
                    narrative,
                    fallback: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "json block failed to parse, synthesizing report");
                fallback(text, today, FallbackReason::InvalidJson(err.to_string()))
            }
        }
    }
}

/// Finds the first block opened by a json-tagged fence and closed by the next fence.
fn locate_json_block(text: &str) -> Option<JsonBlock<'_>> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let start = text.to_ascii_lowercase().find(JSON_FENCE_OPEN)?;
    let body_start = start + JSON_FENCE_OPEN.len();
    let close = text[body_start..].find(FENCE)?;
    Some(JsonBlock {
        body: text[body_start..body_start + close].trim(),
        end: body_start + close + FENCE.len(),
    })
}

fn fallback(text: &str, today: NaiveDate, reason: FallbackReason) -> Extraction {
    let report = MarketReport {
        date: today.format("%Y-%m-%d").to_string(),
        sentiment: MarketSentiment {
            total_turnover: UNAVAILABLE_MARKER.to_string(),
            sentiment_description: PARSE_FAILED_MARKER.to_string(),
            ..MarketSentiment::default()
        },
        style_analysis: PARSE_FAILED_MARKER.to_string(),
        summary: text.to_string(),
        ..MarketReport::default()
    };
    Extraction {
        report,
        narrative: text.to_string(),
        fallback: Some(reason),
    }
}
