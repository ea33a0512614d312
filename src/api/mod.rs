pub mod enrich;

pub use enrich::EnrichmentJob;

pub use crate::core::batch::{EnrichError, RunConfig, RunSummary};
pub use crate::core::caption::CaptionEngine;
pub use crate::core::fetch::HttpFetcher;
pub use crate::core::recognize::RecognitionAdapter;
