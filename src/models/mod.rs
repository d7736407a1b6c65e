pub mod plan;
pub mod platform;
pub mod watchlist;
