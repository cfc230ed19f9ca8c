//! The durable local fallback: one JSON blob under a fixed file name.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{Result, StoreError};
use crate::transaction::Transaction;
use crate::utils::ensure_dir;

const CACHE_FILE: &str = "transactions.json";
const TMP_SUFFIX: &str = "tmp";

/// Stores the serialized transaction list on disk.
///
/// The cache is written on every balance recomputation regardless of the
/// active storage mode, so local data stays warm while the remote service is
/// primary.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    /// Creates a cache rooted at `data_dir`, creating the directory when
    /// missing.
    pub fn new(data_dir: &Path) -> Result<Self> {
        ensure_dir(data_dir)?;
        Ok(Self {
            path: data_dir.join(CACHE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached list. A missing file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::CacheParse] when the blob is not valid JSON for
    /// a transaction list.
    pub fn load(&self) -> Result<Vec<Transaction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let transactions =
            serde_json::from_str(&data).map_err(|err| StoreError::CacheParse(err.to_string()))?;
        Ok(transactions)
    }

    /// Replaces the cached list, writing to a temp file and renaming so a
    /// failed write never clobbers the previous blob.
    pub fn save(&self, transactions: &[Transaction]) -> Result<()> {
        let json = serde_json::to_string_pretty(transactions)
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;
    use tempfile::tempdir;

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new(TransactionKind::Income, "Gehalt", 2000.0).unwrap(),
            Transaction::new(TransactionKind::Expense, "Miete", 500.0).unwrap(),
        ]
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let cache = LocalCache::new(temp.path()).expect("create cache");
        let transactions = sample_transactions();

        cache.save(&transactions).expect("save transactions");
        let loaded = cache.load().expect("load transactions");

        assert_eq!(loaded, transactions);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let temp = tempdir().unwrap();
        let cache = LocalCache::new(temp.path()).unwrap();
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_blob_is_a_parse_error() {
        let temp = tempdir().unwrap();
        let cache = LocalCache::new(temp.path()).unwrap();
        fs::write(cache.path(), "{ not json ]").unwrap();

        let err = cache.load().expect_err("corrupt blob must fail to parse");
        assert!(matches!(err, StoreError::CacheParse(_)), "got {err:?}");
    }

    #[test]
    fn failed_write_preserves_previous_blob() {
        let temp = tempdir().unwrap();
        let cache = LocalCache::new(temp.path()).unwrap();
        let transactions = sample_transactions();
        cache.save(&transactions).unwrap();

        // A directory squatting on the temp file name forces File::create to
        // fail before the rename.
        fs::create_dir_all(tmp_path(cache.path())).unwrap();
        let err = cache.save(&[]).expect_err("blocked temp file must fail");
        assert!(matches!(err, StoreError::Storage(_)), "got {err:?}");

        assert_eq!(cache.load().unwrap(), transactions);
    }
}
