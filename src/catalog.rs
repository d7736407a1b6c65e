use once_cell::sync::Lazy;

use crate::models::platform::PlatformRecord;

fn record(id: &str, name: &str, monthly_price: f64, color: &str) -> PlatformRecord {
    PlatformRecord {
        id: id.to_string(),
        name: name.to_string(),
        monthly_price,
        color: color.to_string(),
    }
}

/// Static platform catalog. Declaration order is the documented final
/// tie-break when platform prices are equal.
pub static PLATFORM_CATALOG: Lazy<Vec<PlatformRecord>> = Lazy::new(|| {
    vec![
        record("netflix", "Netflix", 15.49, "#E50914"),
        record("disney", "Disney+", 13.99, "#113CCF"),
        record("prime", "Prime Video", 8.99, "#00A8E1"),
        record("hbo", "Max", 16.99, "#741DEB"),
        record("appletv", "Apple TV+", 9.99, "#000000"),
        record("hulu", "Hulu", 9.99, "#1CE783"),
        record("paramount", "Paramount+", 11.99, "#0064FF"),
        record("peacock", "Peacock", 7.99, "#FA3F1C"),
    ]
});

pub fn platform_by_id(id: &str) -> Option<&'static PlatformRecord> {
    PLATFORM_CATALOG.iter().find(|platform| platform.id == id)
}

/// Display name for a platform id, falling back to the raw id for
/// identifiers outside the catalog.
pub fn platform_name(id: &str) -> String {
    platform_by_id(id)
        .map(|platform| platform.name.clone())
        .unwrap_or_else(|| id.to_string())
}

pub fn platform_price(id: &str) -> Option<f64> {
    platform_by_id(id).map(|platform| platform.monthly_price)
}

/// Position in the catalog declaration, used as the last tie-break.
pub fn declaration_index(id: &str) -> usize {
    PLATFORM_CATALOG
        .iter()
        .position(|platform| platform.id == id)
        .unwrap_or(usize::MAX)
}

/// Monthly cost of subscribing to every catalog platform at once, the
/// baseline for the savings estimate.
pub fn catalog_monthly_total() -> f64 {
    PLATFORM_CATALOG
        .iter()
        .map(|platform| platform.monthly_price)
        .sum()
}
