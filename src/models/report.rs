//! Structured market review record recovered from a generated report.
//!
//! Field names follow the camelCase JSON schema the generation prompt asks
//! for. Every scalar and list field tolerates absence and wrong types by
//! falling back to its default, so a sloppy but well-formed JSON block still
//! yields a usable record. Only `sentiment` is mandatory.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

/// Full market review for a single trading day.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketReport {
    /// Trading date the review describes (`YYYY-MM-DD` when the service complies).
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub date: String,
    pub sentiment: MarketSentiment,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub hot_sectors: Vec<HotSector>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub ladder: Vec<LadderLevel>,
    /// One-line description of the prevailing trading style.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub style_analysis: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub style_stats: Vec<StyleStat>,
    #[serde(default, rename = "macro", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "DefaultOnError")]
    pub macro_overview: Option<MacroOverview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "DefaultOnError")]
    pub fund_flows: Option<FundFlows>,
    /// Free-text narrative that followed the JSON block.
    #[serde(default, rename = "aiSummary")]
    #[serde_as(as = "DefaultOnError")]
    pub summary: String,
}

/// Market breadth statistics and the derived sentiment score.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSentiment {
    /// Combined turnover of both exchanges, unit included (e.g. "1.5万亿").
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub total_turnover: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub up_count: u32,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub down_count: u32,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub flat_count: u32,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub limit_up_count: u32,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub limit_down_count: u32,
    /// 0-100 score.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub sentiment_score: f64,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub sentiment_description: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSector {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub limit_up_count: u32,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub leader_stock: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub reason: String,
    /// Representative strong stocks in the sector.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub stock_list: Vec<String>,
    /// Stocks that hit their first limit-up today.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub first_board_list: Vec<String>,
}

/// One tier of the consecutive limit-up ladder, e.g. "5连板".
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderLevel {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub level: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub stocks: Vec<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub reason: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleStat {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub label: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub score: f64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroOverview {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub summary: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub items: Vec<MacroItem>,
}

/// Overseas index, commodity or FX quote.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroItem {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub price: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub change: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    pub is_up: bool,
}

/// Sectors ranked by main-capital net inflow over two lookback windows.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundFlows {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub day3: Vec<FundFlowItem>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub day5: Vec<FundFlowItem>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundFlowItem {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    /// Net inflow with unit, e.g. "20亿".
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub amount: String,
}

/// Source reference attached by the search-augmented service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRef {
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CitationRef {
    pub fn new(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            title,
        }
    }

    /// Title to show for the source, "Source" when the service sent none.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => "Source",
        }
    }
}

/// Unparsed service output for one acquisition attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub text: String,
    pub citations: Vec<CitationRef>,
}

impl RawResponse {
    pub fn new(text: impl Into<String>, citations: Vec<CitationRef>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }
}
