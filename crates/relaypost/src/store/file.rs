//! JSON Lines mapping store.
//!
//! Every `save` appends one `{"source_id": …, "destination_id": …}` line and
//! fsyncs it. On open the log is replayed into memory; later lines win.
//! A final line cut short by a crash mid-append is dropped and truncated
//! away; corruption anywhere else is an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{MappingStore, StoreError, StoreResult};

#[derive(Debug, Serialize, Deserialize)]
struct MappingRecord {
    source_id: String,
    destination_id: String,
}

/// File-backed mapping store.
#[derive(Clone)]
pub struct FileMappingStore {
    path: PathBuf,
    entries: Arc<DashMap<String, String>>,
    log: Arc<Mutex<File>>,
}

impl FileMappingStore {
    /// Open (or create) the log at `path` and replay it.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::file_io(parent, e))?;
        }

        let Replay { entries, repair } = replay(&path).await?;
        debug!(path = %path.display(), entries = entries.len(), "Replayed mapping log");

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::file_io(&path, e))?;

        match repair {
            Some(Repair::Truncate(offset)) => {
                warn!(path = %path.display(), offset, "Dropping torn final mapping record");
                log.set_len(offset)
                    .await
                    .map_err(|e| StoreError::file_io(&path, e))?;
            }
            Some(Repair::Terminate) => {
                log.write_all(b"\n")
                    .await
                    .map_err(|e| StoreError::file_io(&path, e))?;
            }
            None => {}
        }
        if repair.is_some() {
            log.sync_data()
                .await
                .map_err(|e| StoreError::file_io(&path, e))?;
        }
        let entries = Arc::new(entries);

        Ok(Self {
            path,
            entries,
            log: Arc::new(Mutex::new(log)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Replay {
    entries: DashMap<String, String>,
    repair: Option<Repair>,
}

/// Fix-up for a final line left without its newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    /// The line is unparsable: cut the log at this byte offset.
    Truncate(u64),
    /// The line is a complete record: append the missing newline.
    Terminate,
}

async fn replay(path: &Path) -> StoreResult<Replay> {
    let entries = DashMap::new();
    let contents = match fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Replay {
                entries,
                repair: None,
            });
        }
        Err(e) => return Err(StoreError::file_io(path, e)),
    };

    let mut offset = 0usize;
    for (index, line) in contents.split_inclusive(|&b| b == b'\n').enumerate() {
        let start = offset;
        offset += line.len();

        let terminated = line.ends_with(b"\n");
        let record = line.strip_suffix(b"\n").unwrap_or(line);
        if record.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<MappingRecord>(record) {
            Ok(record) => {
                entries.insert(record.source_id, record.destination_id);
                if !terminated {
                    return Ok(Replay {
                        entries,
                        repair: Some(Repair::Terminate),
                    });
                }
            }
            // Only the last line can lack its newline.
            Err(_) if !terminated => {
                return Ok(Replay {
                    entries,
                    repair: Some(Repair::Truncate(start as u64)),
                });
            }
            Err(source) => {
                return Err(StoreError::Corrupt {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                });
            }
        }
    }
    Ok(Replay {
        entries,
        repair: None,
    })
}

#[async_trait]
impl MappingStore for FileMappingStore {
    async fn find(&self, source_id: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(source_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, source_id: &str, destination_id: &str) -> StoreResult<()> {
        let record = MappingRecord {
            source_id: source_id.to_string(),
            destination_id: destination_id.to_string(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        {
            let mut log = self.log.lock().await;
            log.write_all(&line)
                .await
                .map_err(|e| StoreError::file_io(&self.path, e))?;
            log.sync_data()
                .await
                .map_err(|e| StoreError::file_io(&self.path, e))?;
        }

        self.entries
            .insert(record.source_id, record.destination_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_creates_missing_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/mappings.jsonl");

        let store = FileMappingStore::open(&path).await.unwrap();
        assert!(store.is_empty());
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn saved_mappings_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings.jsonl");

        let store = FileMappingStore::open(&path).await.unwrap();
        store.save("100.1", "P1").await.unwrap();
        store.save("100.2", "P2").await.unwrap();
        store.save("100.1", "C9").await.unwrap();
        drop(store);

        let reopened = FileMappingStore::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.find("100.1").await.unwrap().as_deref(), Some("C9"));
        assert_eq!(reopened.find("100.2").await.unwrap().as_deref(), Some("P2"));
        assert_eq!(reopened.find("100.3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_line_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings.jsonl");
        std::fs::write(
            &path,
            "{\"source_id\":\"1\",\"destination_id\":\"a\"}\n\nnot json\n",
        )
        .unwrap();

        let result = FileMappingStore::open(&path).await;
        match result {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 3),
            Err(other) => panic!("expected corrupt error, got {other}"),
            Ok(_) => panic!("expected corrupt error"),
        }
    }

    #[tokio::test]
    async fn torn_final_record_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings.jsonl");
        let intact = "{\"source_id\":\"1\",\"destination_id\":\"a\"}\n";
        std::fs::write(&path, format!("{intact}{{\"source_id\":\"2\",\"dest")).unwrap();

        let store = FileMappingStore::open(&path).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("1").await.unwrap().as_deref(), Some("a"));
        assert_eq!(store.find("2").await.unwrap(), None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), intact);

        store.save("2", "b").await.unwrap();
        drop(store);

        let reopened = FileMappingStore::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.find("2").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn unterminated_valid_record_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings.jsonl");
        std::fs::write(&path, "{\"source_id\":\"1\",\"destination_id\":\"a\"}").unwrap();

        let store = FileMappingStore::open(&path).await.unwrap();
        assert_eq!(store.find("1").await.unwrap().as_deref(), Some("a"));
        store.save("2", "b").await.unwrap();
        drop(store);

        let reopened = FileMappingStore::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.find("2").await.unwrap().as_deref(), Some("b"));
    }
}
