//! Shared configuration, error and document types for the SOG summarizer.

pub mod config;
pub mod error;
pub mod types;

pub use config::SogConfig;
pub use error::{Result, SogError};
pub use types::{summary_file_name, Document, NO_TEXT_MESSAGE};
