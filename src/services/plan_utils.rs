use chrono::{Months, NaiveDate};

use crate::error::{AppError, AppResult};

pub const DAILY_WATCH_MINUTES: i64 = 120;
pub const MONTH_DAYS: i64 = 30;
pub const MONTHLY_CAPACITY_MINUTES: i64 = DAILY_WATCH_MINUTES * MONTH_DAYS;

pub const NEAR_BUDGET_RATIO: f64 = 0.9;
pub const COST_EPSILON: f64 = 1e-6;

/// Conversion to hours happens only at presentation boundaries; all
/// planning math stays in integer minutes.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

/// Simulated days needed to watch `minutes` at the fixed daily rate.
pub fn days_for_minutes(minutes: i64) -> i64 {
    if minutes <= 0 {
        return 0;
    }
    (minutes + DAILY_WATCH_MINUTES - 1) / DAILY_WATCH_MINUTES
}

pub fn month_start(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| AppError::validation("无效的起始月份"))
}

pub fn advance_month(date: NaiveDate) -> AppResult<NaiveDate> {
    date.checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::validation("月份推进超出范围"))
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

pub fn fits_budget(current: f64, addition: f64, budget: f64) -> bool {
    current + addition <= budget + COST_EPSILON
}

pub fn near_budget_limit(cost: f64, budget: f64) -> bool {
    budget > 0.0 && cost >= budget * NEAR_BUDGET_RATIO - COST_EPSILON
}
