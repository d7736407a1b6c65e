use tracing::debug;

use crate::catalog;
use crate::models::watchlist::{Priority, WatchlistEntry};
use crate::services::content_state::ContentLedger;

/// The single highest-priority tier that still has schedulable content.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBucket {
    pub priority: Priority,
    pub entry_ids: Vec<String>,
}

/// An entry is schedulable when it is not deferred, at least one of its
/// effective platforms exists in the catalog, and it has unwatched time.
pub fn is_schedulable(entry: &WatchlistEntry, ledger: &ContentLedger) -> bool {
    if entry.is_deferred() || ledger.remaining(&entry.id) == 0 {
        return false;
    }
    entry
        .effective_platforms()
        .iter()
        .any(|platform_id| catalog::platform_by_id(platform_id).is_some())
}

/// Scan tiers in strict high → medium → low order and return the first
/// one with schedulable content. `None` is the rotation loop's primary
/// termination signal.
pub fn active_bucket(
    watchlist: &[WatchlistEntry],
    ledger: &ContentLedger,
) -> Option<ActiveBucket> {
    for priority in Priority::ALL {
        let entry_ids: Vec<String> = watchlist
            .iter()
            .filter(|entry| entry.priority == priority && is_schedulable(entry, ledger))
            .map(|entry| entry.id.clone())
            .collect();

        if !entry_ids.is_empty() {
            debug!(
                target: "app::selector",
                tier = %priority,
                count = entry_ids.len(),
                "active priority bucket"
            );
            return Some(ActiveBucket {
                priority,
                entry_ids,
            });
        }
    }

    None
}
