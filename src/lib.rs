#![doc(test(attr(deny(warnings))))]

//! Finance Core keeps a personal ledger of income and expense entries in
//! sync with a remote transactions service, falling back to a durable local
//! cache whenever the remote store is unconfigured or unreachable.

pub mod config;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod store;
pub mod transaction;
pub mod utils;

pub use config::Config;
pub use errors::{Result, StoreError};
pub use store::FinanceStore;
pub use transaction::{Transaction, TransactionKind};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}
