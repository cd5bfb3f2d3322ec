// Export our modules for use in the binary, the web dashboard and tests
pub mod app;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod config;
pub mod domain;
pub mod feed;
pub mod home_city;
pub mod overlap;
pub mod radar;
pub mod selection;
pub mod storage;
pub mod trip;

pub use app::{Beacon, BeaconError, BeaconStats, Feed};
pub use catalog::{Catalog, CatalogError};
pub use domain::{Legend, SortMode, StaticEvent};
pub use storage::{KeyValueStore, StorageError, StorageEvents, StorageKey};
