//! Drape Core - outfit analysis relay.
//!
//! Drape takes an uploaded outfit photo, asks a vision provider for tags and
//! colors, and asks a language model for fashion recommendations based on
//! them.
//!
//! # Architecture
//!
//! ```text
//! Upload → Stage → Vision upload → (Tags ‖ Colors) → Normalize → LLM → JSON
//! ```
//!
//! The staged file is removed exactly once on every exit path. Face-attribute
//! analysis is a separate client in [`face`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use drape_core::{Analyzer, Config};
//!
//! #[tokio::main]
//! async fn main() -> drape_core::Result<()> {
//!     let config = Config::load()?;
//!     let analyzer = Analyzer::from_config(&config);
//!
//!     let bytes = std::fs::read("./outfit.jpg")?;
//!     let upload = analyzer.store().stage("outfit.jpg", None, &bytes).await?;
//!     let result = analyzer.analyze(upload).await?;
//!     println!("{:?}", result.recommendations);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod face;
pub mod format;
pub mod llm;
pub mod output;
pub mod server;
pub mod types;
pub mod upload;
pub mod vision;

pub use analyzer::{AnalyzeOptions, Analyzer};
pub use config::Config;
pub use error::{
    AnalyzeError, ConfigError, DrapeError, ErrorKind, FaceError, FaceErrorKind,
    RecommendationParseFailure, Result,
};
pub use face::{FaceAttributes, FaceClient, FaceSummary};
pub use output::{AnalysisRecord, OutputFormat, ReportWriter};
pub use server::{router, serve, AppState};
pub use types::{AnalysisResult, ColorProfile, ColorSwatch, StyleBrief, Tag, TagSet, UploadHandle};
pub use upload::{LocalUploadStore, StagedUpload, UploadStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
