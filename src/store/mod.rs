pub mod disk;
pub mod memory;

use crate::core::cache::RateStore;
use crate::core::config::AppConfig;
pub use disk::DiskRateStore;
pub use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the on-disk rate cache under the configured data path, falling back to
/// an in-memory store when the database cannot be opened.
pub fn open_rate_store(config: &AppConfig) -> Arc<dyn RateStore> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskRateStore::open(&path.join("cache")));

    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Rate cache unavailable, using in-memory store for this run: {:#}",
                e
            );
            Arc::new(MemoryRateStore::new())
        }
    }
}
