//! The transaction state manager: an in-memory list reconciled with the
//! remote service, with the local cache as fallback and passive backup.

use uuid::Uuid;

use crate::config::Config;
use crate::errors::{Result, StoreError};
use crate::notify::{announce_add, announce_delete, announce_startup, Notify};
use crate::storage::{LocalCache, RemoteStore, SqliteRemote, StorageMode, TransactionRow};
use crate::transaction::{balance_of, Transaction, TransactionKind};

/// How a committed mutation was persisted.
#[derive(Debug)]
pub enum Commit {
    /// Confirmed by the remote service.
    Remote,
    /// Saved to the local cache only.
    Local,
    /// The optimistic update was undone after the remote write failed.
    RolledBack(StoreError),
    /// The remote delete failed; state was replaced by a fresh remote read.
    Resynced(StoreError),
}

/// The outcome of an add, including the overdraft flag raised before the
/// commit was attempted.
#[derive(Debug)]
pub struct AddReceipt {
    pub transaction: Transaction,
    pub commit: Commit,
    /// The expense pushed the projected balance below zero. Flagged, never
    /// blocked.
    pub overdraft: bool,
}

impl AddReceipt {
    pub fn kind(&self) -> TransactionKind {
        self.transaction.kind
    }
}

/// The outcome of a delete.
#[derive(Debug)]
pub enum DeleteReceipt {
    Removed(Commit),
    /// The id was not present; nothing changed and nothing was announced.
    Missing,
}

/// What happened during session initialization.
#[derive(Debug)]
pub enum InitReport {
    /// Remote mode, with the number of transactions fetched.
    Remote { fetched: usize },
    /// Local mode, with the failure that forced the fallback (`None` when no
    /// remote was configured) and the number of cached entries loaded.
    Local {
        cause: Option<StoreError>,
        loaded: usize,
    },
}

/// Owns the transaction list, the derived balance, and the sync state for
/// one user session.
///
/// All mutations run on the caller's single thread; each add or delete
/// completes its optimistic-update-then-confirm sequence before returning,
/// so operations never interleave.
pub struct FinanceStore {
    transactions: Vec<Transaction>,
    balance: f64,
    loading: bool,
    error: Option<String>,
    mode: StorageMode,
    cache: LocalCache,
    notifier: Box<dyn Notify>,
}

impl FinanceStore {
    /// Starts a session from `config`: opens the remote database when one is
    /// configured, then runs the initialization protocol.
    ///
    /// # Errors
    ///
    /// Returns an error only when the local data directory cannot be
    /// created. Every remote failure falls back to local mode instead.
    pub fn open(config: &Config, notifier: Box<dyn Notify>) -> Result<Self> {
        let cache = LocalCache::new(&config.data_dir)?;
        let remote = match &config.remote_database {
            None => None,
            Some(path) => match SqliteRemote::open(path) {
                Ok(remote) => Some(Box::new(remote) as Box<dyn RemoteStore>),
                Err(err) => {
                    // An unopenable database is handled like any other
                    // remote failure during initialization.
                    tracing::warn!("remote database could not be opened: {err}");
                    Some(Box::new(UnreachableRemote(err.to_string())) as Box<dyn RemoteStore>)
                }
            },
        };
        Ok(Self::with_backends(remote, cache, notifier))
    }

    /// Starts a session with explicit backends. This is the seam for remote
    /// services other than the bundled SQLite one.
    pub fn with_backends(
        remote: Option<Box<dyn RemoteStore>>,
        cache: LocalCache,
        notifier: Box<dyn Notify>,
    ) -> Self {
        let mut store = Self {
            transactions: Vec::new(),
            balance: 0.0,
            loading: true,
            error: None,
            mode: StorageMode::Local,
            cache,
            notifier,
        };
        let report = store.initialize(remote);
        store.refresh();
        store.loading = false;
        announce_startup(&report, store.notifier.as_ref());
        store
    }

    /// Runs the initialization protocol and settles the storage mode.
    fn initialize(&mut self, remote: Option<Box<dyn RemoteStore>>) -> InitReport {
        let remote = match remote {
            // No remote configured: silent local mode.
            None => return self.fall_back(None),
            Some(remote) => remote,
        };
        match remote.verify_schema() {
            Ok(true) => {}
            Ok(false) => return self.fall_back(Some(StoreError::SchemaMissing)),
            Err(err) => return self.fall_back(Some(err)),
        }
        match fetch_all(remote.as_ref()) {
            Ok(transactions) => {
                let fetched = transactions.len();
                self.transactions = transactions;
                self.mode = StorageMode::Remote(remote);
                self.error = None;
                InitReport::Remote { fetched }
            }
            Err(err) => self.fall_back(Some(err)),
        }
    }

    /// Switches to local mode and loads whatever the cache holds. A cache
    /// parse failure is logged and treated as "no local data".
    fn fall_back(&mut self, cause: Option<StoreError>) -> InitReport {
        self.mode = StorageMode::Local;
        self.error = cause.as_ref().map(ToString::to_string);
        self.transactions = match self.cache.load() {
            Ok(transactions) => transactions,
            Err(err) => {
                tracing::warn!("local cache unreadable, starting empty: {err}");
                Vec::new()
            }
        };
        InitReport::Local {
            cause,
            loaded: self.transactions.len(),
        }
    }

    /// Records a new income or expense.
    ///
    /// The entry is prepended optimistically, then confirmed against the
    /// remote service when one is active; a rejected insert rolls the
    /// optimistic update back. Notifications are dispatched from the
    /// returned receipt as a separate step.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::InvalidInput] for a blank description or a
    /// non-positive amount; state is untouched in that case.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: f64,
    ) -> Result<AddReceipt> {
        let transaction = Transaction::new(kind, description, amount)?;
        let receipt = self.commit_add(transaction);
        announce_add(&receipt, self.notifier.as_ref());
        Ok(receipt)
    }

    fn commit_add(&mut self, transaction: Transaction) -> AddReceipt {
        let overdraft = transaction.kind == TransactionKind::Expense
            && self.balance - transaction.amount < 0.0;

        // Optimistic update: visible before any persistence confirmation.
        self.transactions.insert(0, transaction.clone());
        self.refresh();

        let remote_result = match &self.mode {
            StorageMode::Remote(remote) => {
                Some(remote.insert(&TransactionRow::from_transaction(&transaction)))
            }
            StorageMode::Local => None,
        };
        let commit = match remote_result {
            None => Commit::Local,
            Some(Ok(())) => {
                self.error = None;
                Commit::Remote
            }
            Some(Err(err)) => {
                self.transactions.retain(|entry| entry.id != transaction.id);
                self.refresh();
                self.error = Some(err.to_string());
                Commit::RolledBack(err)
            }
        };
        AddReceipt {
            transaction,
            commit,
            overdraft,
        }
    }

    /// Deletes the transaction with `id`. An unknown id is a silent no-op.
    ///
    /// The removal is optimistic; when the remote delete fails the store
    /// resynchronizes by replacing its state with a fresh remote read rather
    /// than re-inserting the one entry, because the failure's exact cause is
    /// unknown.
    pub fn delete_transaction(&mut self, id: Uuid) -> DeleteReceipt {
        let receipt = self.commit_delete(id);
        announce_delete(&receipt, self.notifier.as_ref());
        receipt
    }

    fn commit_delete(&mut self, id: Uuid) -> DeleteReceipt {
        let before = self.transactions.len();
        self.transactions.retain(|entry| entry.id != id);
        if self.transactions.len() == before {
            return DeleteReceipt::Missing;
        }
        self.refresh();

        let remote_result = match &self.mode {
            StorageMode::Remote(remote) => Some(remote.delete_by_id(&id.to_string())),
            StorageMode::Local => None,
        };
        let commit = match remote_result {
            None => Commit::Local,
            Some(Ok(())) => {
                self.error = None;
                Commit::Remote
            }
            Some(Err(err)) => {
                self.resync();
                self.error = Some(err.to_string());
                Commit::Resynced(err)
            }
        };
        DeleteReceipt::Removed(commit)
    }

    /// Replaces in-memory state wholesale with a fresh remote read. When the
    /// re-read also fails, the cached list is the best remaining truth.
    fn resync(&mut self) {
        let fetched = match &self.mode {
            StorageMode::Remote(remote) => fetch_all(remote.as_ref()),
            StorageMode::Local => self.cache.load(),
        };
        match fetched {
            Ok(transactions) => self.transactions = transactions,
            Err(err) => {
                tracing::warn!("resync failed, reloading the local cache: {err}");
                if let Ok(cached) = self.cache.load() {
                    self.transactions = cached;
                }
            }
        }
        self.refresh();
    }

    /// Recomputes the balance and mirrors the list into the local cache.
    ///
    /// The cache write happens in every storage mode so local data stays
    /// warm while the remote service is primary. A failed backup write is
    /// logged, never surfaced.
    fn refresh(&mut self) {
        self.balance = balance_of(&self.transactions);
        if let Err(err) = self.cache.save(&self.transactions) {
            tracing::warn!("local backup write failed: {err}");
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn storage_mode(&self) -> &StorageMode {
        &self.mode
    }

    /// Ends the session, flushing the cache one last time.
    pub fn close(self) {
        if let Err(err) = self.cache.save(&self.transactions) {
            tracing::warn!("final backup write failed: {err}");
        }
        tracing::debug!("session closed with {} transactions", self.transactions.len());
    }
}

/// Fetches every remote row, newest first, mapped into the in-memory shape.
fn fetch_all(remote: &dyn RemoteStore) -> Result<Vec<Transaction>> {
    let mut transactions = remote
        .select_all()?
        .into_iter()
        .map(TransactionRow::into_transaction)
        .collect::<Result<Vec<_>>>()?;
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(transactions)
}

/// Stands in for a remote database that could not even be opened, so the
/// initialization protocol handles it through its normal failure path.
struct UnreachableRemote(String);

impl RemoteStore for UnreachableRemote {
    fn verify_schema(&self) -> Result<bool> {
        Err(StoreError::RemoteFetch(self.0.clone()))
    }

    fn select_all(&self) -> Result<Vec<TransactionRow>> {
        Err(StoreError::RemoteFetch(self.0.clone()))
    }

    fn insert(&self, _row: &TransactionRow) -> Result<()> {
        Err(StoreError::RemoteWrite(self.0.clone()))
    }

    fn delete_by_id(&self, _id: &str) -> Result<()> {
        Err(StoreError::RemoteWrite(self.0.clone()))
    }
}
