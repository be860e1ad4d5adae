//! Persisted device metadata: user-assigned tags and last estimated
//! positions, keyed by device MAC.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::error;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::scanner::Position;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceStore {
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub positions: HashMap<String, Position>,
}

/// Load the device store, falling back to an empty one when the file is
/// missing or unreadable.
pub async fn load(path: &Path) -> DeviceStore {
    match read(path).await {
        Ok(store) => store,
        Err(err) => {
            if path.exists() {
                error!("read device store {}: {:#}", path.display(), err);
            }
            DeviceStore::default()
        }
    }
}

async fn read(path: &Path) -> Result<DeviceStore> {
    let data = fs::read_to_string(path)
        .await
        .context("Failed to read device store")?;
    let store = serde_json::from_str(&data).context("Failed to parse device store")?;
    Ok(store)
}

pub async fn save(path: &Path, store: &DeviceStore) -> Result<()> {
    let data =
        serde_json::to_string_pretty(store).context("Failed to serialize device store")?;
    fs::write(path, data)
        .await
        .context("Failed to write device store")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");

        let mut store = DeviceStore::default();
        store
            .tags
            .insert("00:11:22:33:44:55".to_string(), "Phone".to_string());
        store.positions.insert(
            "00:11:22:33:44:55".to_string(),
            Position {
                x: 51.0,
                y: 29.3,
                floor: 1,
            },
        );

        save(&path, &store).await.unwrap();
        assert_eq!(load(&path).await, store);
    }

    #[tokio::test]
    async fn partial_store_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, r#"{ "tags": { "aa:bb:cc:dd:ee:ff": "TV" } }"#)
            .await
            .unwrap();

        let store = load(&path).await;
        assert_eq!(store.tags.len(), 1);
        assert!(store.positions.is_empty());
    }
}
