use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use finance_core::notify::{Notify, Severity};
use finance_core::storage::{RemoteStore, TransactionRow};
use finance_core::{Result, StoreError};

/// Collects notifications so tests can assert on severity and wording.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(s, message)| *s == severity && message.contains(needle))
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Notify for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// An in-memory remote whose writes can be made to fail on demand, for
/// exercising the rollback and resync paths.
#[derive(Clone, Default)]
pub struct ScriptedRemote {
    rows: Arc<Mutex<Vec<TransactionRow>>>,
    fail_inserts: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    fail_selects: Arc<AtomicBool>,
}

impl ScriptedRemote {
    pub fn with_rows(rows: Vec<TransactionRow>) -> Self {
        let remote = Self::default();
        *remote.rows.lock().unwrap() = rows;
        remote
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_selects(&self, fail: bool) {
        self.fail_selects.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<TransactionRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl RemoteStore for ScriptedRemote {
    fn verify_schema(&self) -> Result<bool> {
        Ok(true)
    }

    fn select_all(&self) -> Result<Vec<TransactionRow>> {
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteFetch("select scripted to fail".into()));
        }
        Ok(self.rows())
    }

    fn insert(&self, row: &TransactionRow) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteWrite("insert scripted to fail".into()));
        }
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteWrite("delete scripted to fail".into()));
        }
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}
