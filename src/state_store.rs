use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::models::NotifiedState;

const STATE_FILE: &str = "notified_products.json";

/// Candidate data directories, most preferred first. The final entry is the
/// unconditional fallback.
const DATA_DIRS: [&str; 3] = ["/var/lib/restock-watcher", "/data", "."];

/// Persistence for the set of already-notified product URLs. One JSON file,
/// reloaded at the start of every cycle and rewritten at the end. Load fails
/// open to an empty set; save is best effort.
pub struct TrackingStore {
    dir: PathBuf,
}

impl TrackingStore {
    pub fn open() -> Self {
        for candidate in DATA_DIRS {
            let path = Path::new(candidate);
            if path.is_dir() && is_writable(path) {
                debug!("Using data directory: {}", path.display());
                return Self {
                    dir: path.to_path_buf(),
                };
            }
        }
        Self {
            dir: PathBuf::from("."),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Missing file, corrupt JSON or any I/O error all yield an empty set.
    pub fn load(&self) -> HashSet<String> {
        let path = self.state_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashSet::new(),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return HashSet::new();
            }
        };

        match serde_json::from_str::<NotifiedState>(&contents) {
            Ok(state) => state.notified.into_iter().collect(),
            Err(e) => {
                warn!("Discarding corrupt state file {}: {}", path.display(), e);
                HashSet::new()
            }
        }
    }

    /// A failed save must not abort the poll cycle.
    pub fn save(&self, notified: &HashSet<String>) {
        let state = NotifiedState {
            notified: notified.iter().cloned().collect(),
            updated: Utc::now(),
        };

        let json = match serde_json::to_string(&state) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize notified products: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(self.state_path(), json) {
            error!("Failed to save notified products: {}", e);
        }
    }
}

/// Mode bits alone cannot tell whether this process can write (a root-owned
/// 755 directory looks writable to everyone), so try an actual write.
fn is_writable(path: &Path) -> bool {
    let probe = path.join(".restock-watcher-probe");
    match fs::File::create(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
