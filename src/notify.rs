//! The fire-and-forget notification channel and the dispatch step that maps
//! store outcomes onto it.

use crate::errors::StoreError;
use crate::store::{AddReceipt, Commit, DeleteReceipt, InitReport};
use crate::transaction::TransactionKind;

/// Severity levels for user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing toast/alert sink.
///
/// The store reports through this trait but never depends on the outcome.
pub trait Notify {
    fn notify(&self, severity: Severity, message: &str);
}

/// Emits notifications as tracing events.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}

/// Announces how session initialization went.
///
/// Remote mode starts silently. Local mode explains why when a remote was
/// expected, and mentions cached entries when any were loaded.
pub fn announce_startup(report: &InitReport, notifier: &dyn Notify) {
    match report {
        InitReport::Remote { .. } => {}
        InitReport::Local { cause, loaded } => {
            match cause {
                None => {}
                Some(StoreError::SchemaMissing) => notifier.notify(
                    Severity::Info,
                    "The remote store is not set up yet. Your data will be kept on this device.",
                ),
                Some(_) => notifier.notify(
                    Severity::Error,
                    "The remote store is unavailable. Your data will be kept on this device.",
                ),
            }
            if *loaded > 0 {
                notifier.notify(Severity::Info, "Loaded transactions from local storage.");
            }
        }
    }
}

/// Announces the outcome of an add, overdraft warning first.
pub fn announce_add(receipt: &AddReceipt, notifier: &dyn Notify) {
    if receipt.overdraft {
        notifier.notify(
            Severity::Warning,
            "Careful: this expense takes your balance below zero!",
        );
    }
    match &receipt.commit {
        Commit::Remote => notifier.notify(Severity::Success, added_message(receipt.kind())),
        Commit::Local => {
            notifier.notify(
                Severity::Info,
                "No remote store available, the entry was saved on this device only.",
            );
            notifier.notify(Severity::Success, added_message(receipt.kind()));
        }
        Commit::RolledBack(_) | Commit::Resynced(_) => notifier.notify(
            Severity::Error,
            "The transaction could not be saved. Try again later.",
        ),
    }
}

/// Announces the outcome of a delete. Deleting an unknown id stays silent.
pub fn announce_delete(receipt: &DeleteReceipt, notifier: &dyn Notify) {
    match receipt {
        DeleteReceipt::Missing => {}
        DeleteReceipt::Removed(Commit::Remote) => {
            notifier.notify(Severity::Success, "Transaction deleted.");
        }
        DeleteReceipt::Removed(Commit::Local) => {
            notifier.notify(
                Severity::Info,
                "No remote store available, the entry was deleted on this device only.",
            );
            notifier.notify(Severity::Success, "Transaction deleted.");
        }
        DeleteReceipt::Removed(Commit::RolledBack(_) | Commit::Resynced(_)) => {
            notifier.notify(
                Severity::Error,
                "The transaction could not be deleted. Try again later.",
            );
        }
    }
}

fn added_message(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Income added successfully.",
        TransactionKind::Expense => "Expense added successfully.",
    }
}
