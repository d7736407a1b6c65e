use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::watchlist::{ContentKind, Priority};

/// Classification of a month's platform set relative to the previous
/// month: first month subscribes, an identical set keeps, a strictly
/// shrinking set cancels, anything else rotates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    Subscribe,
    Rotate,
    Keep,
    Cancel,
}

impl PlanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanAction::Subscribe => "subscribe",
            PlanAction::Rotate => "rotate",
            PlanAction::Keep => "keep",
            PlanAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeferralReason {
    NoPlatform,
    AwaitingDecision,
    OverBudget,
    ExceedsCapacity,
}

impl DeferralReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferralReason::NoPlatform => "no-platform",
            DeferralReason::AwaitingDecision => "awaiting-decision",
            DeferralReason::OverBudget => "over-budget",
            DeferralReason::ExceedsCapacity => "exceeds-capacity",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DeferralReason::NoPlatform => "no available platform carries this title",
            DeferralReason::AwaitingDecision => "pending user decision",
            DeferralReason::OverBudget => "could not fit within budget constraints",
            DeferralReason::ExceedsCapacity => {
                "runtime exceeds an entire month of viewing capacity"
            }
        }
    }
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeferredItem {
    pub entry_id: String,
    pub title: String,
    pub reason: DeferralReason,
    pub message: String,
}

/// One selected platform for one month, with the entries it covers and
/// a value-density metric (covered minutes per currency unit) used only
/// for ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedService {
    pub platform_id: String,
    pub platform_name: String,
    pub monthly_cost: f64,
    pub covered_entry_ids: Vec<String>,
    pub value_density: f64,
    pub assignable_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub entry_id: String,
    pub title: String,
    pub kind: ContentKind,
    pub priority: Priority,
    pub start_day: u32,
    pub end_day: u32,
    pub watched_minutes: i64,
    pub watched_hours: f64,
    pub remaining_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    pub month: String,
    pub year: i32,
    pub services: Vec<OptimizedService>,
    pub scheduled_items: Vec<ScheduledItem>,
    pub total_cost: f64,
    pub action: PlanAction,
    pub total_watched_hours: f64,
    pub near_budget_limit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub run_id: String,
    pub generated_at: String,
    pub services: Vec<OptimizedService>,
    pub deferred_items: Vec<DeferredItem>,
    pub monthly_cost: f64,
    pub estimated_savings: f64,
    pub coverage_percent: u32,
    pub explanation: String,
    pub monthly_plans: Vec<MonthlyPlan>,
    pub months_needed: usize,
    pub average_monthly_cost: f64,
}
