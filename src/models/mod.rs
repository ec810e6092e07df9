pub mod report;

pub use report::{
    CitationRef, FundFlowItem, FundFlows, HotSector, LadderLevel, MacroItem, MacroOverview,
    MarketReport, MarketSentiment, RawResponse, StyleStat,
};
