//! # linkscout - look before you click
//!
//! Takes a user-supplied URL, decides whether it is safe to visit and, if it
//! is, describes the page behind it: title, description, author, preview
//! image, content type, canonical URL, locale and publish date.
//!
//! ## Features
//!
//! - Syntactic URL validation before any network access
//! - Page retrieval through a rendering fetch service
//! - Threat lookup against a Safe Browsing style API
//! - Selector-based metadata extraction with fixed fallback rules
//! - Run tokens so that only the newest submission's result is displayed
//! - Async API with Tokio and structured logging with `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use linkscout::{Config, Pipeline, ResultSlot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let slot = ResultSlot::new();
//!     let token = slot.issue();
//!     let result = pipeline.run(token, "https://www.rust-lang.org").await;
//!
//!     match result.metadata() {
//!         Some(metadata) => println!("{:?}", metadata.title),
//!         None => println!("{}", result.error().map(|e| e.to_string()).unwrap_or_default()),
//!     }
//!     slot.apply(result).await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod http;

pub mod fetcher;
pub mod metadata;
pub mod pipeline;
pub mod threat;
pub mod validator;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, ErrorKind, PipelineError};
pub use metadata::{SiteMetadata, extract_metadata};
pub use pipeline::{CheckPolicy, Pipeline, PipelineResult, PipelineState, ResultSlot, RunToken};
pub use validator::{CandidateUrl, validate};

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::PipelineError;
    pub use crate::error::Result;
}
