//! Core type definitions shared by every asset store backend.

pub mod job;
pub mod save_path;

pub use job::{CleanupReport, JobIdentity, JobRef};
pub use save_path::SavePath;
