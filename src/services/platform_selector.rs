use std::collections::HashSet;

use tracing::{debug, info};

use crate::catalog;
use crate::models::platform::PlatformRecord;
use crate::models::watchlist::WatchlistEntry;
use crate::services::bucket_selector::{is_schedulable, ActiveBucket};
use crate::services::content_state::ContentLedger;
use crate::services::plan_utils::{fits_budget, COST_EPSILON};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlatform {
    pub id: String,
    pub name: String,
    pub monthly_price: f64,
    pub covered_entry_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformSelection {
    pub platforms: Vec<SelectedPlatform>,
    pub total_cost: f64,
}

impl PlatformSelection {
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn platform_ids(&self) -> HashSet<String> {
        self.platforms
            .iter()
            .map(|platform| platform.id.clone())
            .collect()
    }

    /// Entries covered this month, deduplicated in selection order.
    pub fn covered_entry_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for platform in &self.platforms {
            for entry_id in &platform.covered_entry_ids {
                if seen.insert(entry_id.clone()) {
                    ids.push(entry_id.clone());
                }
            }
        }
        ids
    }
}

/// Cheapest catalog platform covering the entry. Ties go to the
/// platform used last month, then to catalog declaration order.
fn cheapest_covering_platform(
    entry: &WatchlistEntry,
    previous_platforms: &HashSet<String>,
) -> Option<&'static PlatformRecord> {
    entry
        .effective_platforms()
        .iter()
        .filter_map(|platform_id| catalog::platform_by_id(platform_id))
        .min_by(|a, b| {
            a.monthly_price
                .total_cmp(&b.monthly_price)
                .then_with(|| {
                    previous_platforms
                        .contains(&b.id)
                        .cmp(&previous_platforms.contains(&a.id))
                })
                .then_with(|| {
                    catalog::declaration_index(&a.id).cmp(&catalog::declaration_index(&b.id))
                })
        })
}

/// Choose a platform subset for one month: greedy over the active
/// bucket's cheapest-covering groups under the hard budget ceiling,
/// then spend leftover budget on strictly lower tiers — reusing
/// selected platforms for free, and re-adding only platforms that were
/// already in use last month (churn minimization; never add a brand-new
/// platform opportunistically).
pub fn select_platforms(
    bucket: &ActiveBucket,
    watchlist: &[WatchlistEntry],
    ledger: &ContentLedger,
    budget: f64,
    previous_platforms: &HashSet<String>,
) -> PlatformSelection {
    let mut groups: Vec<(&'static PlatformRecord, Vec<String>)> = Vec::new();

    for entry_id in &bucket.entry_ids {
        let Some(entry) = watchlist.iter().find(|entry| &entry.id == entry_id) else {
            continue;
        };
        let Some(platform) = cheapest_covering_platform(entry, previous_platforms) else {
            continue;
        };

        match groups.iter_mut().find(|(record, _)| record.id == platform.id) {
            Some((_, entry_ids)) => entry_ids.push(entry.id.clone()),
            None => groups.push((platform, vec![entry.id.clone()])),
        }
    }

    // Stable, reproducible order: price ascending, then declaration order.
    groups.sort_by(|(a, _), (b, _)| {
        a.monthly_price
            .total_cmp(&b.monthly_price)
            .then_with(|| catalog::declaration_index(&a.id).cmp(&catalog::declaration_index(&b.id)))
    });

    let mut selected: Vec<SelectedPlatform> = Vec::new();
    let mut total_cost = 0.0;

    for (platform, entry_ids) in groups {
        if fits_budget(total_cost, platform.monthly_price, budget) {
            total_cost += platform.monthly_price;
            selected.push(SelectedPlatform {
                id: platform.id.clone(),
                name: platform.name.clone(),
                monthly_price: platform.monthly_price,
                covered_entry_ids: entry_ids,
            });
        } else {
            debug!(
                target: "app::selector",
                platform = %platform.id,
                price = platform.monthly_price,
                entries = entry_ids.len(),
                "platform group deferred this month, over budget"
            );
        }
    }

    // Leftover budget: strictly lower tiers only.
    for entry in watchlist {
        if entry.priority.rank() <= bucket.priority.rank() || !is_schedulable(entry, ledger) {
            continue;
        }

        let effective = entry.effective_platforms();

        let reusable = selected
            .iter_mut()
            .filter(|platform| effective.contains(&platform.id))
            .min_by(|a, b| {
                a.monthly_price.total_cmp(&b.monthly_price).then_with(|| {
                    catalog::declaration_index(&a.id).cmp(&catalog::declaration_index(&b.id))
                })
            });
        if let Some(platform) = reusable {
            platform.covered_entry_ids.push(entry.id.clone());
            continue;
        }

        let candidate = effective
            .iter()
            .filter_map(|platform_id| catalog::platform_by_id(platform_id))
            .filter(|platform| previous_platforms.contains(&platform.id))
            .filter(|platform| fits_budget(total_cost, platform.monthly_price, budget))
            .min_by(|a, b| {
                a.monthly_price.total_cmp(&b.monthly_price).then_with(|| {
                    catalog::declaration_index(&a.id).cmp(&catalog::declaration_index(&b.id))
                })
            });
        if let Some(platform) = candidate {
            total_cost += platform.monthly_price;
            selected.push(SelectedPlatform {
                id: platform.id.clone(),
                name: platform.name.clone(),
                monthly_price: platform.monthly_price,
                covered_entry_ids: vec![entry.id.clone()],
            });
        }
    }

    // Hard ceiling, re-validated before handing the set to the loop.
    debug_assert!(total_cost <= budget + COST_EPSILON);

    if !selected.is_empty() {
        info!(
            target: "app::selector",
            platforms = selected.len(),
            total_cost,
            budget,
            "platform set selected"
        );
    }

    PlatformSelection {
        platforms: selected,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::watchlist::{ContentKind, EntryResolution, Priority};
    use crate::services::bucket_selector::active_bucket;

    fn entry(id: &str, priority: Priority, platforms: &[&str]) -> WatchlistEntry {
        WatchlistEntry {
            id: id.to_string(),
            title: id.to_string(),
            kind: ContentKind::Movie,
            priority,
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            resolution: EntryResolution::Unresolved,
            duration_minutes: None,
            episode_count: None,
        }
    }

    fn select(
        watchlist: &[WatchlistEntry],
        budget: f64,
        previous: &HashSet<String>,
    ) -> PlatformSelection {
        let ledger = ContentLedger::new(watchlist);
        let bucket = active_bucket(watchlist, &ledger).expect("bucket expected");
        select_platforms(&bucket, watchlist, &ledger, budget, previous)
    }

    #[test]
    fn greedy_selection_respects_the_budget_ceiling() {
        // peacock 7.99 + hbo 16.99 would exceed 20.0
        let watchlist = vec![
            entry("cheap", Priority::High, &["peacock"]),
            entry("expensive", Priority::High, &["hbo"]),
        ];
        let selection = select(&watchlist, 20.0, &HashSet::new());

        assert_eq!(selection.platforms.len(), 1);
        assert_eq!(selection.platforms[0].id, "peacock");
        assert!(selection.total_cost <= 20.0);
        assert_eq!(selection.covered_entry_ids(), vec!["cheap".to_string()]);
    }

    #[test]
    fn price_tie_prefers_previous_month_then_declaration_order() {
        // appletv and hulu both cost 9.99
        let watchlist = vec![entry("show", Priority::High, &["hulu", "appletv"])];

        let fresh = select(&watchlist, 15.0, &HashSet::new());
        assert_eq!(fresh.platforms[0].id, "appletv");

        let mut previous = HashSet::new();
        previous.insert("hulu".to_string());
        let churn_averse = select(&watchlist, 15.0, &previous);
        assert_eq!(churn_averse.platforms[0].id, "hulu");
    }

    #[test]
    fn platform_override_wins_over_cheaper_candidates() {
        let mut overridden = entry("movie", Priority::High, &["peacock"]);
        overridden.resolution = EntryResolution::PlatformOverride("netflix".to_string());
        let watchlist = vec![overridden];

        let selection = select(&watchlist, 20.0, &HashSet::new());
        assert_eq!(selection.platforms[0].id, "netflix");
    }

    #[test]
    fn leftover_budget_reuses_platforms_but_never_adds_new_ones() {
        let watchlist = vec![
            entry("high", Priority::High, &["prime"]),
            entry("low-shared", Priority::Low, &["prime"]),
            entry("low-new", Priority::Low, &["peacock"]),
        ];

        let selection = select(&watchlist, 30.0, &HashSet::new());
        assert_eq!(selection.platforms.len(), 1);
        assert_eq!(selection.platforms[0].id, "prime");
        assert!(selection
            .covered_entry_ids()
            .contains(&"low-shared".to_string()));
        // plenty of budget left, but peacock was not used last month
        assert!(!selection.covered_entry_ids().contains(&"low-new".to_string()));

        let mut previous = HashSet::new();
        previous.insert("peacock".to_string());
        let with_history = select(&watchlist, 30.0, &previous);
        assert_eq!(with_history.platforms.len(), 2);
        assert!(with_history
            .covered_entry_ids()
            .contains(&"low-new".to_string()));
    }

    #[test]
    fn lower_tier_additions_still_respect_the_budget() {
        let watchlist = vec![
            entry("high", Priority::High, &["prime"]),
            entry("low", Priority::Low, &["hbo"]),
        ];
        let mut previous = HashSet::new();
        previous.insert("hbo".to_string());

        // 8.99 + 16.99 > 20.0, so hbo stays out even though it was used last month
        let selection = select(&watchlist, 20.0, &previous);
        assert_eq!(selection.platforms.len(), 1);
        assert_eq!(selection.platforms[0].id, "prime");
    }
}
