//! 记录集合的整体快照存取
//!
//! 永远整体重写（不追加、不按记录打补丁），磁盘上的状态任何时刻都是
//! 一份完整可加载的快照。写入先落临时文件再原子改名。

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use super::EnrichError;
use crate::models::PostRecord;

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 启动时整体加载。解析失败是致命错误，在任何处理开始前中止。
    pub fn load(&self) -> Result<Vec<PostRecord>, EnrichError> {
        let text = fs::read_to_string(&self.path)?;
        let records: Vec<PostRecord> = serde_json::from_str(&text)?;
        info!("📖 Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    pub fn save(&self, records: &[PostRecord]) -> Result<(), EnrichError> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };

        serde_json::to_writer_pretty(tmp.as_file_mut(), records)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| EnrichError::Io(e.error))?;

        info!("💾 Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("posts.json"));

        let records: Vec<PostRecord> = serde_json::from_value(serde_json::json!([
            { "shortcode": "a", "media_type": "image", "media_urls": ["u"], "likes": 3 },
            { "p_num": 7, "media_type": "video" }
        ]))
        .unwrap();

        store.save(&records).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load(), Err(EnrichError::Io(_))));
    }

    #[test]
    fn test_load_corrupt_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, "{ not json").unwrap();
        let store = SnapshotStore::new(&path);
        assert!(matches!(store.load(), Err(EnrichError::Json(_))));
    }

    #[test]
    fn test_save_replaces_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, "[]").unwrap();

        let store = SnapshotStore::new(&path);
        let records: Vec<PostRecord> =
            serde_json::from_value(serde_json::json!([{ "shortcode": "only" }])).unwrap();
        store.save(&records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }
}
