//! Core traits defined in `crowdstore-core` and implemented by `crowdstore-storage`.

pub mod asset_store;

pub use asset_store::AssetStore;
