//! Persisted access point positions, a flat JSON map keyed by BSSID.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::error;
use tokio::fs;

use crate::scanner::Position;

/// Load the position map. A store that does not exist yet or cannot be
/// read yields an empty map; the error is logged, never propagated.
pub async fn load(path: &Path) -> HashMap<String, Position> {
    match read(path).await {
        Ok(positions) => positions,
        Err(err) => {
            if path.exists() {
                error!("read access point store {}: {:#}", path.display(), err);
            }
            HashMap::new()
        }
    }
}

async fn read(path: &Path) -> Result<HashMap<String, Position>> {
    let data = fs::read_to_string(path)
        .await
        .context("Failed to read access point store")?;
    let positions = serde_json::from_str(&data).context("Failed to parse access point store")?;
    Ok(positions)
}

pub async fn save(path: &Path, positions: &HashMap<String, Position>) -> Result<()> {
    let data = serde_json::to_string_pretty(positions)
        .context("Failed to serialize access point store")?;
    fs::write(path, data)
        .await
        .context("Failed to write access point store")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access-points.json");

        let mut positions = HashMap::new();
        positions.insert(
            "aa:bb:cc:dd:ee:01".to_string(),
            Position {
                x: 120.0,
                y: 40.5,
                floor: 2,
            },
        );
        positions.insert("aa:bb:cc:dd:ee:02".to_string(), Position::default());

        save(&path, &positions).await.unwrap();
        let loaded = load(&path).await;
        assert_eq!(loaded, positions);
    }

    #[tokio::test]
    async fn missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("nope.json")).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn corrupt_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access-points.json");
        fs::write(&path, "{not json").await.unwrap();
        let loaded = load(&path).await;
        assert!(loaded.is_empty());
    }
}
