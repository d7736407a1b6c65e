use std::collections::HashSet;

use chrono::{Datelike, Utc};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::plan::{MonthlyPlan, OptimizationResult, OptimizedService, PlanAction};
use crate::models::watchlist::WatchlistEntry;
use crate::services::bucket_selector::{self, is_schedulable};
use crate::services::content_state::ContentLedger;
use crate::services::fair_scheduler;
use crate::services::plan_utils::{
    self, minutes_to_hours, near_budget_limit, COST_EPSILON, MONTHLY_CAPACITY_MINUTES,
};
use crate::services::platform_selector::{self, PlatformSelection};
use crate::services::result_aggregator;

const HORIZON_BUFFER_MONTHS: usize = 3;
const MAX_PLAN_MONTHS: usize = 24;

/// Loop state: `Done` when no schedulable content remains, `Stalled`
/// when an active bucket exists but no affordable platform set does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotationState {
    Active,
    Done,
    Stalled,
}

/// Drives bucket selection, platform selection and fair scheduling
/// across simulated months until the watchlist is exhausted or no
/// further progress is possible. One planner call is a pure function of
/// (watchlist, budget) plus the static catalog; all tracking state is
/// built and discarded per call.
pub struct RotationPlanner {
    budget: f64,
    start: chrono::NaiveDate,
}

impl RotationPlanner {
    pub fn new(budget: f64) -> Self {
        let today = Utc::now().date_naive();
        let start = today.with_day(1).unwrap_or(today);
        Self { budget, start }
    }

    /// Fixed start month for reproducible plans.
    pub fn with_start(budget: f64, year: i32, month: u32) -> AppResult<Self> {
        Ok(Self {
            budget,
            start: plan_utils::month_start(year, month)?,
        })
    }

    pub fn optimize(&self, watchlist: &[WatchlistEntry]) -> AppResult<OptimizationResult> {
        if watchlist.is_empty() || self.budget <= 0.0 {
            warn!(
                target: "app::rotation",
                budget = self.budget,
                entries = watchlist.len(),
                "degenerate input, no plan produced"
            );
            return Ok(result_aggregator::degenerate_result());
        }

        let mut ledger = ContentLedger::new(watchlist);
        let horizon = self.horizon_months(watchlist, &ledger);
        let mut plans: Vec<MonthlyPlan> = Vec::new();
        let mut previous_platforms: HashSet<String> = HashSet::new();
        let mut current_month = self.start;
        let mut state = RotationState::Active;

        while state == RotationState::Active && plans.len() < horizon {
            let Some(bucket) = bucket_selector::active_bucket(watchlist, &ledger) else {
                state = RotationState::Done;
                break;
            };

            let selection = platform_selector::select_platforms(
                &bucket,
                watchlist,
                &ledger,
                self.budget,
                &previous_platforms,
            );
            if selection.is_empty() {
                info!(
                    target: "app::rotation",
                    tier = %bucket.priority,
                    "no affordable platform set for the active tier, stalling"
                );
                state = RotationState::Stalled;
                break;
            }

            // Defensive re-check of the selector's budget contract;
            // a breach halts the run instead of emitting a bad plan.
            if selection.total_cost > self.budget + COST_EPSILON {
                let _ = AppError::budget_invariant(selection.total_cost, self.budget);
                state = RotationState::Stalled;
                break;
            }

            // Snapshot coverage before the ledger is consumed so value
            // density reflects what this month's platforms can serve.
            let services = build_services(&selection, &ledger);

            let outcome = fair_scheduler::schedule_month(&selection, watchlist, &mut ledger)?;
            if outcome.total_watched_minutes == 0 {
                // e.g. every covered item is an oversized atomic movie
                warn!(
                    target: "app::rotation",
                    "selected platforms yielded no watchable time, stalling"
                );
                state = RotationState::Stalled;
                break;
            }

            let platform_ids = selection.platform_ids();
            let action = classify_action(plans.len(), &platform_ids, &previous_platforms);

            let plan = MonthlyPlan {
                month: plan_utils::month_label(current_month),
                year: current_month.year(),
                services,
                scheduled_items: outcome.items,
                total_cost: selection.total_cost,
                action,
                total_watched_hours: minutes_to_hours(outcome.total_watched_minutes),
                near_budget_limit: near_budget_limit(selection.total_cost, self.budget),
            };
            info!(
                target: "app::rotation",
                month = %plan.month,
                year = plan.year,
                action = %plan.action,
                cost = plan.total_cost,
                watched_hours = plan.total_watched_hours,
                "month planned"
            );
            plans.push(plan);

            previous_platforms = platform_ids;
            current_month = plan_utils::advance_month(current_month)?;
        }

        if state == RotationState::Active {
            debug!(
                target: "app::rotation",
                months = plans.len(),
                "horizon cap reached with content remaining"
            );
        }

        Ok(result_aggregator::aggregate(
            watchlist,
            &ledger,
            plans,
            self.budget,
        ))
    }

    /// Bounded horizon: enough months to drain the schedulable minutes
    /// plus a small buffer, hard-capped to keep output finite.
    fn horizon_months(&self, watchlist: &[WatchlistEntry], ledger: &ContentLedger) -> usize {
        let schedulable_minutes: i64 = watchlist
            .iter()
            .filter(|entry| is_schedulable(entry, ledger))
            .map(|entry| ledger.remaining(&entry.id))
            .sum();

        let base = ((schedulable_minutes + MONTHLY_CAPACITY_MINUTES - 1)
            / MONTHLY_CAPACITY_MINUTES)
            .max(0) as usize;
        (base + HORIZON_BUFFER_MONTHS).min(MAX_PLAN_MONTHS)
    }
}

fn classify_action(
    month_index: usize,
    current: &HashSet<String>,
    previous: &HashSet<String>,
) -> PlanAction {
    if month_index == 0 {
        PlanAction::Subscribe
    } else if current == previous {
        PlanAction::Keep
    } else if current.is_subset(previous) {
        PlanAction::Cancel
    } else {
        PlanAction::Rotate
    }
}

fn build_services(selection: &PlatformSelection, ledger: &ContentLedger) -> Vec<OptimizedService> {
    selection
        .platforms
        .iter()
        .map(|platform| {
            let covered_minutes: i64 = platform
                .covered_entry_ids
                .iter()
                .map(|entry_id| ledger.remaining(entry_id))
                .sum();
            let value_density = if platform.monthly_price > 0.0 {
                covered_minutes as f64 / platform.monthly_price
            } else {
                0.0
            };

            OptimizedService {
                platform_id: platform.id.clone(),
                platform_name: platform.name.clone(),
                monthly_cost: platform.monthly_price,
                covered_entry_ids: platform.covered_entry_ids.clone(),
                value_density,
                assignable_minutes: covered_minutes.min(MONTHLY_CAPACITY_MINUTES),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn action_classification_tracks_platform_churn() {
        let previous = ids(&["netflix", "hulu"]);

        assert_eq!(
            classify_action(0, &ids(&["netflix"]), &HashSet::new()),
            PlanAction::Subscribe
        );
        assert_eq!(
            classify_action(1, &ids(&["netflix", "hulu"]), &previous),
            PlanAction::Keep
        );
        assert_eq!(
            classify_action(1, &ids(&["netflix"]), &previous),
            PlanAction::Cancel
        );
        assert_eq!(
            classify_action(1, &ids(&["netflix", "prime"]), &previous),
            PlanAction::Rotate
        );
    }
}
