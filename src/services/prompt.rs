use crate::credentials::Credential;

/// The four trading styles the service must score, in display order.
pub const STYLE_LABELS: [&str; 4] = ["权重蓝筹", "成长赛道", "连板接力", "微盘投机"];

/// Minimum narrative length (characters) requested after the JSON block.
pub const MIN_NARRATIVE_CHARS: usize = 300;

/// Opening marker of the machine-readable block the service is asked to emit.
pub const JSON_FENCE_OPEN: &str = "```json";
pub const FENCE: &str = "```";

/// Authenticated, immutable request for one market review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub prompt: String,
    /// Attach the live search tool so figures come from today's pages.
    pub use_search: bool,
    pub credential: Credential,
}

/// Authors the fixed review instructions. Same credential in, same request out.
#[derive(Debug, Clone)]
pub struct ReportRequestBuilder {
    use_search: bool,
}

impl Default for ReportRequestBuilder {
    fn default() -> Self {
        Self { use_search: true }
    }
}

impl ReportRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, enabled: bool) -> Self {
        self.use_search = enabled;
        self
    }

    pub fn build(&self, credential: &Credential) -> ReportRequest {
        ReportRequest {
            prompt: render_prompt(),
            use_search: self.use_search,
            credential: credential.clone(),
        }
    }
}

fn render_prompt() -> String {
    let style_lines = STYLE_LABELS
        .iter()
        .enumerate()
        .map(|(idx, label)| format!("     {}. \"{}\"", idx + 1, label))
        .collect::<Vec<_>>()
        .join("\n");
    let style_stats = STYLE_LABELS
        .iter()
        .map(|label| format!("      {{ \"label\": \"{label}\", \"score\": 50 }}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r##"You are a quantitative trader covering China A-shares. Use the Google Search tool to look up the full-market review for **today** (if today is not a trading day, use the most recent trading day).

**Hard rule: every figure must come from live search results. Do not rely on memorized data and never invent numbers. If a value cannot be found, write "N/A" or 0.**

Search for and extract:
1. **Market breadth**:
   - Combined turnover of both exchanges with unit (e.g. 1.5万亿).
   - Number of advancing, declining and unchanged stocks.
   - Number of limit-up and limit-down stocks.
   - A 0-100 market sentiment score derived from the figures above.

2. **Hot sectors**:
   - The 3-5 strongest themes of the day.
   - For each: sector name, limit-up count, leading stock, 3-5 representative strong stocks, first-board (1板) stocks in the sector, and the driver behind the move.

3. **Consecutive limit-up ladder**:
   - The highest streak height of the day.
   - Representative stocks for each streak tier and the core theme driving that tier.

4. **Style analysis**:
   - Describe where capital is concentrating.
   - Score each of these four styles from 0 to 100:
{style_lines}

5. **Macro backdrop**:
   - Overnight US close (Nasdaq, S&P 500, Dow Jones, popular China ADRs).
   - COMEX gold and crude oil.
   - Offshore yuan (USD/CNH).
   - One sentence on how the backdrop affects A-shares today.

6. **Main-capital fund flows**:
   - Search sector fund-flow rankings (e.g. 东方财富 行业板块资金流向 or 同花顺 资金流向).
   - The top 3-5 sectors by main-capital net inflow over the last 3 days and the last 5 days, amounts with units (e.g. "20亿").

When the search is complete, answer in exactly two parts.

**Part 1: JSON block**
A single {open} ... {fence} block in this shape:
{open}
{{
  "date": "YYYY-MM-DD",
  "sentiment": {{
    "totalTurnover": "amount with unit",
    "upCount": 1234,
    "downCount": 1234,
    "flatCount": 123,
    "limitUpCount": 80,
    "limitDownCount": 5,
    "sentimentScore": 85,
    "sentimentDescription": "short description"
  }},
  "macro": {{
    "summary": "one-sentence macro impact",
    "items": [
      {{ "name": "纳斯达克", "price": "16300", "change": "+1.2%", "isUp": true }}
    ]
  }},
  "fundFlows": {{
    "day3": [ {{ "name": "半导体", "amount": "50亿" }} ],
    "day5": [ {{ "name": "半导体", "amount": "120亿" }} ]
  }},
  "hotSectors": [
    {{
      "name": "sector",
      "limitUpCount": 10,
      "leaderStock": "leader",
      "stockList": ["A", "B", "C"],
      "firstBoardList": ["D", "E"],
      "reason": "driver"
    }}
  ],
  "ladder": [
    {{ "level": "5连板", "stocks": ["A", "B"], "reason": "theme" }}
  ],
  "styleStats": [
{style_stats}
  ],
  "styleAnalysis": "one-sentence style summary"
}}
{fence}

**Part 2: narrative review**
After the JSON block, write a review of at least {min_chars} characters in Markdown. Think like a seasoned short-term trader: cover fund flows, the current phase of the sentiment cycle (launch, build-up, climax, divergence, ebb) and the outlook for the next session.
"##,
        open = JSON_FENCE_OPEN,
        fence = FENCE,
        min_chars = MIN_NARRATIVE_CHARS,
    )
}
