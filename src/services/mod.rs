pub mod bucket_selector;
pub mod content_state;
pub mod fair_scheduler;
pub mod plan_utils;
pub mod platform_selector;
pub mod result_aggregator;
pub mod rotation_planner;
