//! Store configuration.

const PAGE_SIZE_DEFAULT: u32 = 50;
const PAGE_SIZE_MAX: u32 = 200;

/// Tuning knobs for the notification store.
///
/// Fields are private so every instance carries a normalized page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    page_size: u32,
}

impl StoreConfig {
    /// Builds a config with `page_size` normalized to the supported range.
    pub fn with_page_size(page_size: Option<u32>) -> Self {
        Self {
            page_size: normalize_page_size(page_size),
        }
    }

    /// Maximum notifications per list page. Always at least 1.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE_DEFAULT,
        }
    }
}

/// Normalizes a requested page size: `0`/absent means default, large values
/// clamp to the maximum.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) | None => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_size, StoreConfig};

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(normalize_page_size(None), 50);
        assert_eq!(normalize_page_size(Some(0)), 50);
        assert_eq!(normalize_page_size(Some(7)), 7);
        assert_eq!(normalize_page_size(Some(10_000)), 200);
        assert_eq!(StoreConfig::with_page_size(Some(3)).page_size(), 3);
        assert_eq!(StoreConfig::with_page_size(Some(0)).page_size(), 50);
        assert_eq!(StoreConfig::default().page_size(), 50);
    }
}
