pub mod catalog;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::services::rotation_planner::RotationPlanner;

use crate::error::AppResult;
use crate::models::plan::OptimizationResult;
use crate::models::watchlist::WatchlistEntry;

/// One call, one plan: compute a month-by-month subscription rotation
/// for the given watchlist under a fixed monthly budget.
pub fn optimize(watchlist: &[WatchlistEntry], budget: f64) -> AppResult<OptimizationResult> {
    RotationPlanner::new(budget).optimize(watchlist)
}
