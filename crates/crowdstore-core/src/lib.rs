//! # crowdstore-core
//!
//! Core crate for crowdstore. Contains the [`AssetStore`] trait, configuration
//! schemas, save-path and job-identity types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other crowdstore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use reqwest::Url;
pub use result::AppResult;
pub use traits::AssetStore;
pub use types::{CleanupReport, JobIdentity, JobRef, SavePath};
