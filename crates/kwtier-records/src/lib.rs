pub mod analysis;
pub mod client;
pub mod error;

pub use analysis::KeywordAnalysis;
pub use client::AnalysisRecorder;
pub use error::RecordsError;
