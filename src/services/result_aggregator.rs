use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::catalog;
use crate::models::plan::{
    DeferralReason, DeferredItem, MonthlyPlan, OptimizationResult, OptimizedService,
};
use crate::models::watchlist::{ContentKind, WatchlistEntry};
use crate::services::content_state::ContentLedger;
use crate::services::plan_utils::MONTHLY_CAPACITY_MINUTES;

/// Post-loop reporting: deferred items with reasons, coverage, savings
/// against a subscribe-to-everything baseline, and the human-readable
/// summary. Never fails; infeasibility is absorbed into the result.
pub fn aggregate(
    watchlist: &[WatchlistEntry],
    ledger: &ContentLedger,
    plans: Vec<MonthlyPlan>,
    budget: f64,
) -> OptimizationResult {
    let deferred_items = collect_deferred(watchlist, ledger);

    let total_entries = watchlist.len();
    let covered_entries = total_entries.saturating_sub(deferred_items.len());
    let coverage_percent = if total_entries == 0 {
        0
    } else {
        ((covered_entries as f64 / total_entries as f64) * 100.0).round() as u32
    };

    let months_needed = plans.len();
    let total_cost: f64 = plans.iter().map(|plan| plan.total_cost).sum();
    let estimated_savings = catalog::catalog_monthly_total() * months_needed as f64 - total_cost;
    let monthly_cost = plans.first().map(|plan| plan.total_cost).unwrap_or(0.0);
    let services: Vec<OptimizedService> = plans
        .first()
        .map(|plan| plan.services.clone())
        .unwrap_or_default();
    let average_monthly_cost = if months_needed == 0 {
        0.0
    } else {
        total_cost / months_needed as f64
    };

    let explanation = build_explanation(
        &plans,
        &deferred_items,
        covered_entries,
        coverage_percent,
        total_cost,
    );

    info!(
        target: "app::rotation",
        months = months_needed,
        coverage = coverage_percent,
        deferred = deferred_items.len(),
        total_cost,
        budget,
        "optimization run aggregated"
    );

    OptimizationResult {
        run_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now().to_rfc3339(),
        services,
        deferred_items,
        monthly_cost,
        estimated_savings,
        coverage_percent,
        explanation,
        monthly_plans: plans,
        months_needed,
        average_monthly_cost,
    }
}

/// Empty or invalid input: zero months, zero cost, no deferred items.
pub fn degenerate_result() -> OptimizationResult {
    OptimizationResult {
        run_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now().to_rfc3339(),
        services: Vec::new(),
        deferred_items: Vec::new(),
        monthly_cost: 0.0,
        estimated_savings: 0.0,
        coverage_percent: 0,
        explanation: "输入为空或预算无效，未能生成订阅计划。".to_string(),
        monthly_plans: Vec::new(),
        months_needed: 0,
        average_monthly_cost: 0.0,
    }
}

fn collect_deferred(watchlist: &[WatchlistEntry], ledger: &ContentLedger) -> Vec<DeferredItem> {
    watchlist
        .iter()
        .filter(|entry| ledger.remaining(&entry.id) > 0)
        .map(|entry| {
            let reason = deferral_reason(entry, ledger);
            DeferredItem {
                entry_id: entry.id.clone(),
                title: entry.title.clone(),
                reason,
                message: reason.description().to_string(),
            }
        })
        .collect()
}

fn deferral_reason(entry: &WatchlistEntry, ledger: &ContentLedger) -> DeferralReason {
    if entry.is_deferred() {
        return DeferralReason::AwaitingDecision;
    }
    let has_usable_platform = entry
        .effective_platforms()
        .iter()
        .any(|platform_id| catalog::platform_by_id(platform_id).is_some());
    if !has_usable_platform {
        return DeferralReason::NoPlatform;
    }
    if entry.kind == ContentKind::Movie && ledger.total(&entry.id) > MONTHLY_CAPACITY_MINUTES {
        return DeferralReason::ExceedsCapacity;
    }
    DeferralReason::OverBudget
}

fn build_explanation(
    plans: &[MonthlyPlan],
    deferred_items: &[DeferredItem],
    covered_entries: usize,
    coverage_percent: u32,
    total_cost: f64,
) -> String {
    if plans.is_empty() {
        return if deferred_items.is_empty() {
            "暂无需要规划的内容。".to_string()
        } else {
            format!(
                "未能在预算内生成可行的订阅计划，{} 个条目被推迟。",
                deferred_items.len()
            )
        };
    }

    let first = &plans[0];
    let platform_names = first
        .services
        .iter()
        .map(|service| service.platform_name.clone())
        .collect::<Vec<_>>()
        .join("、");
    let leading = first
        .services
        .iter()
        .max_by(|a, b| a.value_density.total_cmp(&b.value_density))
        .map(|service| service.platform_name.clone())
        .unwrap_or_default();

    let deferral_note = if deferred_items.is_empty() {
        String::new()
    } else {
        format!("{} 个条目暂时无法安排。", deferred_items.len())
    };

    format!(
        "规划了 {} 个月的订阅轮换：首月订阅 {}（月费 {:.2}），性价比最高的平台是 {}。\
共覆盖 {} 个条目（覆盖率 {}%），总支出 {:.2}。{}",
        plans.len(),
        platform_names,
        first.total_cost,
        leading,
        covered_entries,
        coverage_percent,
        total_cost,
        deferral_note
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::watchlist::{EntryResolution, Priority};

    fn entry(id: &str, platforms: &[&str], resolution: EntryResolution) -> WatchlistEntry {
        WatchlistEntry {
            id: id.to_string(),
            title: id.to_string(),
            kind: ContentKind::Movie,
            priority: Priority::High,
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            resolution,
            duration_minutes: None,
            episode_count: None,
        }
    }

    #[test]
    fn deferral_reasons_are_specific() {
        let pending = entry("pending", &["netflix"], EntryResolution::Deferred);
        let orphan = entry("orphan", &[], EntryResolution::Unresolved);
        let mut epic = entry("epic", &["netflix"], EntryResolution::Unresolved);
        epic.duration_minutes = Some(MONTHLY_CAPACITY_MINUTES + 1);
        let broke = entry("broke", &["hbo"], EntryResolution::Unresolved);

        let watchlist = vec![pending, orphan, epic, broke];
        let ledger = ContentLedger::new(&watchlist);
        let deferred = collect_deferred(&watchlist, &ledger);

        let reason_of = |id: &str| {
            deferred
                .iter()
                .find(|item| item.entry_id == id)
                .map(|item| item.reason)
                .expect("deferred item expected")
        };

        assert_eq!(reason_of("pending"), DeferralReason::AwaitingDecision);
        assert_eq!(reason_of("orphan"), DeferralReason::NoPlatform);
        assert_eq!(reason_of("epic"), DeferralReason::ExceedsCapacity);
        assert_eq!(reason_of("broke"), DeferralReason::OverBudget);
        assert_eq!(
            deferred
                .iter()
                .find(|item| item.entry_id == "broke")
                .unwrap()
                .message,
            "could not fit within budget constraints"
        );
    }

    #[test]
    fn aggregate_with_no_plans_reports_zero_cost() {
        let watchlist = vec![entry("only", &["hbo"], EntryResolution::Unresolved)];
        let ledger = ContentLedger::new(&watchlist);
        let result = aggregate(&watchlist, &ledger, Vec::new(), 5.0);

        assert_eq!(result.months_needed, 0);
        assert_eq!(result.monthly_cost, 0.0);
        assert_eq!(result.coverage_percent, 0);
        assert_eq!(result.deferred_items.len(), 1);
        assert!(result.services.is_empty());
    }
}
