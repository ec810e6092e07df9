pub mod dedup;
pub mod extraction;
pub mod gemini;
pub mod generation;
pub mod prompt;

pub use dedup::dedupe_citations;
pub use extraction::{Extraction, FallbackReason, ResponseExtractor};
pub use gemini::GeminiClient;
pub use generation::{GenerationError, GenerationService};
pub use prompt::{ReportRequest, ReportRequestBuilder};
