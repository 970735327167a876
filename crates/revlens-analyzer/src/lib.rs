//! Review analysis pipeline.
//!
//! Fetches a product page, extracts review texts, caps them to a batch,
//! asks the Gemini model for a structured [`Analysis`](revlens_core::Analysis)
//! under a fixed system contract, and validates the model's JSON. Every
//! failure surfaces as one [`AnalyzeError`] kind.

pub mod batch;
pub mod contract;
pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod validate;

pub use batch::{sample, ReviewBatch};
pub use contract::{SYSTEM_CONTRACT, SYSTEM_CONTRACT_VERSION};
pub use error::{AnalyzeError, ErrorKind, ModelError, SetupError};
pub use gemini::GeminiClient;
pub use pipeline::{Analyzer, Stage};
pub use validate::parse_analysis;
