pub mod local;
pub mod remote;

use std::fmt;

pub use local::LocalCache;
pub use remote::{RemoteStore, SqliteRemote, TransactionRow};

/// Where new entries are persisted, decided once at session start.
pub enum StorageMode {
    /// Writes go to the remote service; the local cache is a passive backup.
    Remote(Box<dyn RemoteStore>),
    /// No usable remote service; the local cache is the only persistence.
    Local,
}

impl StorageMode {
    pub fn is_remote(&self) -> bool {
        matches!(self, StorageMode::Remote(_))
    }
}

impl fmt::Debug for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Remote(_) => f.write_str("Remote"),
            StorageMode::Local => f.write_str("Local"),
        }
    }
}
