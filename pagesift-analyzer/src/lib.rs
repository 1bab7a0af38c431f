pub mod analyzer;
pub mod cancel;
pub mod checker;
pub mod config;
pub mod document;
pub mod error;
pub mod result;

pub use analyzer::Analyzer;
pub use cancel::CancelToken;
pub use config::AnalyzerConfig;
pub use error::AnalyzeError;
pub use result::{AnalysisResult, HtmlVersion};
