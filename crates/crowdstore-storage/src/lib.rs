//! # crowdstore-storage
//!
//! Asset store backends for crowdstore. The CouchDB backend keeps every saved
//! file as a standalone attachment on its own document; the local backend
//! copies files under a root directory.

pub mod manager;
pub mod providers;

pub use manager::build_asset_store;
#[cfg(feature = "couchdb")]
pub use providers::CouchDbStore;
#[cfg(feature = "local")]
pub use providers::LocalAssetStore;
