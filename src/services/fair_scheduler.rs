use std::collections::HashMap;

use tracing::debug;

use crate::error::AppResult;
use crate::models::plan::ScheduledItem;
use crate::models::watchlist::{ContentKind, Priority, WatchlistEntry};
use crate::services::content_state::ContentLedger;
use crate::services::plan_utils::{
    days_for_minutes, minutes_to_hours, DAILY_WATCH_MINUTES, MONTHLY_CAPACITY_MINUTES, MONTH_DAYS,
};
use crate::services::platform_selector::PlatformSelection;

#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    pub items: Vec<ScheduledItem>,
    pub total_watched_minutes: i64,
}

/// Split a capacity of minutes equally across entries with the given
/// needs. Surplus from entries needing less than their share is
/// redistributed across the still-needy set in a bounded fixed-point
/// loop; minutes too small to floor-divide are handed out one at a
/// time. After this, an entry is left under its need only when the
/// capacity itself ran out.
pub fn fair_allocate(needs: &[i64], capacity: i64) -> Vec<i64> {
    let mut allocations = vec![0_i64; needs.len()];
    let mut available = capacity.max(0);
    let mut rounds = 0;

    loop {
        let pending: Vec<usize> = (0..needs.len())
            .filter(|&index| allocations[index] < needs[index])
            .collect();
        if pending.is_empty() || available == 0 || rounds >= needs.len() {
            break;
        }

        let share = available / pending.len() as i64;
        if share == 0 {
            break;
        }

        for &index in &pending {
            let take = (needs[index] - allocations[index]).min(share);
            allocations[index] += take;
            available -= take;
        }
        rounds += 1;
    }

    // Final leftover minutes, one at a time.
    let mut progressed = true;
    while available > 0 && progressed {
        progressed = false;
        for index in 0..needs.len() {
            if available == 0 {
                break;
            }
            if allocations[index] < needs[index] {
                allocations[index] += 1;
                available -= 1;
                progressed = true;
            }
        }
    }

    allocations
}

/// Allocate one simulated month of viewing (60 hours, tracked in
/// minutes) across the entries covered by this month's platforms.
/// Tiers are processed strictly high → low; within a tier, movies are
/// scheduled atomically on their own day before series split the
/// remaining capacity fairly. A shared day cursor converts allocations
/// into day ranges and nothing is scheduled past day 30 — overflow
/// minutes stay in the ledger for a later month.
pub fn schedule_month(
    selection: &PlatformSelection,
    watchlist: &[WatchlistEntry],
    ledger: &mut ContentLedger,
) -> AppResult<ScheduleOutcome> {
    let entries_by_id: HashMap<&str, &WatchlistEntry> = watchlist
        .iter()
        .map(|entry| (entry.id.as_str(), entry))
        .collect();

    let covered_ids = selection.covered_entry_ids();

    let mut items = Vec::new();
    let mut total_watched_minutes = 0_i64;
    let mut capacity_minutes = MONTHLY_CAPACITY_MINUTES;
    // 1-based next free simulated day
    let mut day_cursor = 1_i64;

    for priority in Priority::ALL {
        if capacity_minutes == 0 || day_cursor > MONTH_DAYS {
            break;
        }

        let tier_entries: Vec<&WatchlistEntry> = covered_ids
            .iter()
            .filter_map(|entry_id| entries_by_id.get(entry_id.as_str()).copied())
            .filter(|entry| entry.priority == priority && ledger.remaining(&entry.id) > 0)
            .collect();
        if tier_entries.is_empty() {
            continue;
        }

        // Movies first: all-or-nothing, one sitting on one day.
        for entry in tier_entries
            .iter()
            .filter(|entry| entry.kind == ContentKind::Movie)
        {
            let need = ledger.remaining(&entry.id);
            if need == 0 {
                continue;
            }
            if need > capacity_minutes || day_cursor > MONTH_DAYS {
                debug!(
                    target: "app::scheduler",
                    entry = %entry.id,
                    need,
                    capacity = capacity_minutes,
                    "movie does not fit this month, kept whole for later"
                );
                continue;
            }

            let remaining = ledger.consume(&entry.id, need)?;
            items.push(ScheduledItem {
                entry_id: entry.id.clone(),
                title: entry.title.clone(),
                kind: entry.kind,
                priority: entry.priority,
                start_day: day_cursor as u32,
                end_day: day_cursor as u32,
                watched_minutes: need,
                watched_hours: minutes_to_hours(need),
                remaining_minutes: remaining,
            });
            capacity_minutes -= need;
            total_watched_minutes += need;
            day_cursor += 1;
        }

        // Series share the tier's remaining capacity equally.
        let series: Vec<&WatchlistEntry> = tier_entries
            .iter()
            .filter(|entry| entry.kind == ContentKind::Series)
            .copied()
            .filter(|entry| ledger.remaining(&entry.id) > 0)
            .collect();
        if series.is_empty() {
            continue;
        }

        let needs: Vec<i64> = series
            .iter()
            .map(|entry| ledger.remaining(&entry.id))
            .collect();
        let allocations = fair_allocate(&needs, capacity_minutes);

        for (entry, allocated) in series.iter().zip(allocations) {
            if allocated == 0 {
                continue;
            }
            let days_left = MONTH_DAYS - day_cursor + 1;
            if days_left <= 0 {
                break;
            }

            // Clamp at the end of the month; the rest stays remaining.
            let watched = allocated.min(days_left * DAILY_WATCH_MINUTES);
            if watched <= 0 {
                continue;
            }

            let days_used = days_for_minutes(watched);
            let remaining = ledger.consume(&entry.id, watched)?;
            items.push(ScheduledItem {
                entry_id: entry.id.clone(),
                title: entry.title.clone(),
                kind: entry.kind,
                priority: entry.priority,
                start_day: day_cursor as u32,
                end_day: (day_cursor + days_used - 1) as u32,
                watched_minutes: watched,
                watched_hours: minutes_to_hours(watched),
                remaining_minutes: remaining,
            });
            capacity_minutes -= watched;
            total_watched_minutes += watched;
            day_cursor += days_used;
        }
    }

    debug!(
        target: "app::scheduler",
        items = items.len(),
        watched_minutes = total_watched_minutes,
        unused_capacity = capacity_minutes,
        "month scheduled"
    );

    Ok(ScheduleOutcome {
        items,
        total_watched_minutes,
    })
}
