//! Asset store backend implementations.

#[cfg(feature = "couchdb")]
pub mod couchdb;
#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "couchdb")]
pub use couchdb::CouchDbStore;
#[cfg(feature = "local")]
pub use local::LocalAssetStore;
