pub mod events;
pub mod grant;
pub mod init;
pub mod lookup;
pub mod sweep;

use std::path::Path;

use gatekeeper_core::GateConfig;
use gatekeeper_state::StateStore;

/// Open the configured store, creating parent directories as needed.
pub fn open_store(config: &GateConfig) -> anyhow::Result<StateStore> {
    Ok(StateStore::open(store_path(config)?)?)
}

/// The configured database path, with its parent directory created.
pub fn store_path(config: &GateConfig) -> anyhow::Result<&Path> {
    let path = config.storage.path.as_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(path)
}
