use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::watchlist::WatchlistEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    pub entry_index: usize,
    pub total_minutes: i64,
    pub remaining_minutes: i64,
}

/// Per-run tracking table for the watchlist: an index-addressed state
/// vector plus an id lookup map. Built fresh for every optimization
/// call and discarded with it; `consume` is the only mutation path and
/// keeps `0 <= remaining <= total`.
#[derive(Debug, Clone)]
pub struct ContentLedger {
    states: Vec<ContentState>,
    index_by_id: HashMap<String, usize>,
}

impl ContentLedger {
    /// Track every entry, including deferred and platform-less ones;
    /// those are simply never selected until their blocker is resolved.
    pub fn new(watchlist: &[WatchlistEntry]) -> Self {
        let mut states = Vec::with_capacity(watchlist.len());
        let mut index_by_id = HashMap::with_capacity(watchlist.len());

        for (entry_index, entry) in watchlist.iter().enumerate() {
            let total_minutes = entry.resolved_duration_minutes();
            index_by_id.insert(entry.id.clone(), states.len());
            states.push(ContentState {
                entry_index,
                total_minutes,
                remaining_minutes: total_minutes,
            });
        }

        Self {
            states,
            index_by_id,
        }
    }

    pub fn state(&self, entry_id: &str) -> Option<&ContentState> {
        self.index_by_id
            .get(entry_id)
            .and_then(|index| self.states.get(*index))
    }

    pub fn remaining(&self, entry_id: &str) -> i64 {
        self.state(entry_id)
            .map(|state| state.remaining_minutes)
            .unwrap_or(0)
    }

    pub fn total(&self, entry_id: &str) -> i64 {
        self.state(entry_id)
            .map(|state| state.total_minutes)
            .unwrap_or(0)
    }

    pub fn is_exhausted(&self, entry_id: &str) -> bool {
        self.remaining(entry_id) == 0
    }

    /// Record watched minutes against an entry, returning the new
    /// remaining counter.
    pub fn consume(&mut self, entry_id: &str, minutes: i64) -> AppResult<i64> {
        if minutes < 0 {
            return Err(AppError::validation_with_details(
                "观看时长不能为负数",
                json!({"entryId": entry_id, "minutes": minutes}),
            ));
        }

        let index = *self.index_by_id.get(entry_id).ok_or_else(|| {
            AppError::validation_with_details("未知的观看条目", json!({"entryId": entry_id}))
        })?;

        let state = &mut self.states[index];
        if minutes > state.remaining_minutes {
            return Err(AppError::validation_with_details(
                "观看时长超过剩余时长",
                json!({
                    "entryId": entry_id,
                    "minutes": minutes,
                    "remaining": state.remaining_minutes,
                }),
            ));
        }

        state.remaining_minutes -= minutes;
        Ok(state.remaining_minutes)
    }

    pub fn total_remaining_minutes(&self) -> i64 {
        self.states
            .iter()
            .map(|state| state.remaining_minutes)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::watchlist::{ContentKind, EntryResolution, Priority};

    fn entry(id: &str, kind: ContentKind, duration: Option<i64>) -> WatchlistEntry {
        WatchlistEntry {
            id: id.to_string(),
            title: id.to_string(),
            kind,
            priority: Priority::High,
            platforms: vec!["netflix".to_string()],
            resolution: EntryResolution::Unresolved,
            duration_minutes: duration,
            episode_count: None,
        }
    }

    #[test]
    fn ledger_initializes_remaining_from_resolved_duration() {
        let watchlist = vec![
            entry("movie", ContentKind::Movie, None),
            entry("series", ContentKind::Series, Some(600)),
        ];
        let ledger = ContentLedger::new(&watchlist);

        assert_eq!(ledger.remaining("movie"), 120);
        assert_eq!(ledger.remaining("series"), 600);
        assert_eq!(ledger.total_remaining_minutes(), 720);
        assert_eq!(ledger.remaining("missing"), 0);
    }

    #[test]
    fn consume_enforces_bounds() {
        let watchlist = vec![entry("movie", ContentKind::Movie, None)];
        let mut ledger = ContentLedger::new(&watchlist);

        assert_eq!(ledger.consume("movie", 90).unwrap(), 30);
        assert!(ledger.consume("movie", 31).is_err());
        assert!(ledger.consume("movie", -1).is_err());
        assert!(ledger.consume("missing", 10).is_err());

        assert_eq!(ledger.consume("movie", 30).unwrap(), 0);
        assert!(ledger.is_exhausted("movie"));
    }
}
