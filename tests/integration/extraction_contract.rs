use marketbrief::models::{
    FundFlowItem, FundFlows, HotSector, LadderLevel, MacroItem, MacroOverview, MarketReport,
    MarketSentiment, RawResponse, StyleStat,
};
use marketbrief::services::extraction::{
    FallbackReason, ResponseExtractor, PARSE_FAILED_MARKER, UNAVAILABLE_MARKER,
};
use marketbrief::services::prompt::STYLE_LABELS;

fn full_report(narrative: &str) -> MarketReport {
    MarketReport {
        date: "2024-06-14".into(),
        sentiment: MarketSentiment {
            total_turnover: "8123亿".into(),
            up_count: 3120,
            down_count: 1904,
            flat_count: 121,
            limit_up_count: 68,
            limit_down_count: 4,
            sentiment_score: 77.5,
            sentiment_description: "放量上攻".into(),
        },
        hot_sectors: vec![HotSector {
            name: "半导体".into(),
            limit_up_count: 11,
            leader_stock: "龙头A".into(),
            reason: "国产替代".into(),
            stock_list: vec!["A".into(), "B".into(), "C".into()],
            first_board_list: vec!["D".into()],
        }],
        ladder: vec![LadderLevel {
            level: "4连板".into(),
            stocks: vec!["E".into()],
            reason: "并购重组".into(),
        }],
        style_analysis: "成长占优".into(),
        style_stats: STYLE_LABELS
            .iter()
            .zip([40.0, 72.0, 65.0, 30.0])
            .map(|(label, score)| StyleStat {
                label: (*label).into(),
                score,
            })
            .collect(),
        macro_overview: Some(MacroOverview {
            summary: "外围偏暖".into(),
            items: vec![MacroItem {
                name: "纳斯达克".into(),
                price: "17688".into(),
                change: "+0.3%".into(),
                is_up: true,
            }],
        }),
        fund_flows: Some(FundFlows {
            day3: vec![FundFlowItem {
                name: "证券".into(),
                amount: "35亿".into(),
            }],
            day5: vec![],
        }),
        summary: narrative.into(),
    }
}

fn fenced(report: &MarketReport, narrative: &str) -> RawResponse {
    let json = serde_json::to_string_pretty(report).unwrap();
    RawResponse::new(format!("Here is today's review.\n```json\n{json}\n```\n\n{narrative}\n"), Vec::new())
}

#[test]
fn serialized_report_round_trips_through_the_fence() {
    let narrative = "## 复盘\n情绪处于发酵阶段，明日关注分歧。";
    let report = full_report(narrative);
    let out = ResponseExtractor::new().extract(&fenced(&report, narrative));
    assert!(out.fallback.is_none());
    assert_eq!(out.report, report);
    assert_eq!(out.narrative, narrative);
}

#[test]
fn absent_optional_blocks_round_trip_as_defaults() {
    let narrative = "short take";
    let mut report = full_report(narrative);
    report.macro_overview = None;
    report.fund_flows = None;
    report.style_stats.clear();
    let out = ResponseExtractor::new().extract(&fenced(&report, narrative));
    assert_eq!(out.report, report);
}

#[test]
fn scenario_with_complete_block() {
    let text = "```json\n{\"date\":\"2024-01-01\",\"sentiment\":{\"totalTurnover\":\"1万亿\",\"upCount\":10,\"downCount\":5,\"flatCount\":1,\"limitUpCount\":2,\"limitDownCount\":0,\"sentimentScore\":70,\"sentimentDescription\":\"strong\"},\"hotSectors\":[],\"ladder\":[],\"styleAnalysis\":\"growth\"}\n```\nNarrative here.";
    let out = ResponseExtractor::new().extract(&RawResponse::new(text, Vec::new()));
    assert_eq!(out.report.date, "2024-01-01");
    assert_eq!(out.report.sentiment.sentiment_score, 70.0);
    assert_eq!(out.report.sentiment.up_count, 10);
    assert_eq!(out.narrative, "Narrative here.");
}

#[test]
fn scenario_with_prose_only() {
    let text = "just some prose, no code block";
    let out = ResponseExtractor::new().extract(&RawResponse::new(text, Vec::new()));
    assert_eq!(out.fallback, Some(FallbackReason::NoJsonBlock));
    assert_eq!(out.report.sentiment.sentiment_description, PARSE_FAILED_MARKER);
    assert_eq!(out.report.sentiment.total_turnover, UNAVAILABLE_MARKER);
    let s = &out.report.sentiment;
    assert_eq!(
        [s.up_count, s.down_count, s.flat_count, s.limit_up_count, s.limit_down_count],
        [0; 5]
    );
    assert_eq!(out.narrative, text);
    assert!(!out.report.date.is_empty());
}

#[test]
fn second_block_never_leaks_into_the_record() {
    let first = full_report("ignored");
    let mut second = full_report("ignored");
    second.date = "1999-12-31".into();
    second.sentiment.up_count = 1;
    let text = format!(
        "```json\n{}\n```\nbetween\n```json\n{}\n```\nafter",
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    let out = ResponseExtractor::new().extract(&RawResponse::new(text, Vec::new()));
    assert_eq!(out.report.date, "2024-06-14");
    assert_eq!(out.report.sentiment.up_count, 3120);
}

#[test]
fn unknown_keys_are_ignored() {
    let text = "```json\n{\"sentiment\":{\"upCount\":5},\"breadthIndex\":0.8,\"extra\":{\"a\":1}}\n```\nfine";
    let out = ResponseExtractor::new().extract(&RawResponse::new(text, Vec::new()));
    assert!(out.fallback.is_none());
    assert_eq!(out.report.sentiment.up_count, 5);
}
