use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MOVIE_MINUTES: i64 = 120;
pub const MINUTES_PER_EPISODE: i64 = 45;
pub const DEFAULT_EPISODE_COUNT: i64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContentKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "movie" => Ok(ContentKind::Movie),
            "series" => Ok(ContentKind::Series),
            other => Err(format!("unsupported content kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Strict processing order: high before medium before low.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Lower rank means higher priority.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unsupported priority: {other}")),
        }
    }
}

/// User-controlled scheduling state of an entry. A platform override is
/// exclusive: it replaces the candidate platform list entirely, and an
/// entry cannot be both deferred and overridden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "platform", rename_all = "camelCase")]
pub enum EntryResolution {
    #[default]
    Unresolved,
    Deferred,
    PlatformOverride(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub title: String,
    pub kind: ContentKind,
    pub priority: Priority,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub resolution: EntryResolution,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub episode_count: Option<i64>,
}

impl WatchlistEntry {
    /// Platform candidates after applying a user override.
    pub fn effective_platforms(&self) -> Vec<String> {
        match &self.resolution {
            EntryResolution::PlatformOverride(platform_id) => vec![platform_id.clone()],
            _ => self.platforms.clone(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.resolution, EntryResolution::Deferred)
    }

    /// Real total runtime in minutes, resolved once per run. Absent
    /// fields fall back deterministically: movie 120 min, series
    /// episode count × 45 min with a default of 10 episodes.
    pub fn resolved_duration_minutes(&self) -> i64 {
        if let Some(minutes) = self.duration_minutes {
            return minutes.max(0);
        }
        match self.kind {
            ContentKind::Movie => DEFAULT_MOVIE_MINUTES,
            ContentKind::Series => {
                let episodes = self.episode_count.unwrap_or(DEFAULT_EPISODE_COUNT).max(1);
                episodes * MINUTES_PER_EPISODE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: ContentKind) -> WatchlistEntry {
        WatchlistEntry {
            id: "entry-1".to_string(),
            title: "Example".to_string(),
            kind,
            priority: Priority::Medium,
            platforms: vec!["netflix".to_string(), "hulu".to_string()],
            resolution: EntryResolution::Unresolved,
            duration_minutes: None,
            episode_count: None,
        }
    }

    #[test]
    fn resolved_duration_uses_defaults() {
        assert_eq!(entry(ContentKind::Movie).resolved_duration_minutes(), 120);
        // 10 default episodes * 45 minutes
        assert_eq!(entry(ContentKind::Series).resolved_duration_minutes(), 450);

        let mut explicit = entry(ContentKind::Series);
        explicit.episode_count = Some(8);
        assert_eq!(explicit.resolved_duration_minutes(), 8 * 45);

        explicit.duration_minutes = Some(300);
        assert_eq!(explicit.resolved_duration_minutes(), 300);
    }

    #[test]
    fn platform_override_replaces_candidate_list() {
        let mut overridden = entry(ContentKind::Movie);
        overridden.resolution = EntryResolution::PlatformOverride("disney".to_string());
        assert_eq!(overridden.effective_platforms(), vec!["disney".to_string()]);
        assert!(!overridden.is_deferred());
    }

    #[test]
    fn priority_order_is_high_medium_low() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::try_from("medium"), Ok(Priority::Medium));
        assert!(Priority::try_from("urgent").is_err());
    }
}
