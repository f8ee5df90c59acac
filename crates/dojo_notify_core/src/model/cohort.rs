//! Cohort ladder.
//!
//! Cohorts are rating-range buckets attached to users and games. Inside this
//! crate they are descriptive metadata plus an ordinal for range filters.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Sentinel for users/games outside the ladder.
pub const NO_COHORT: &str = "NO_COHORT";

const COHORT_LADDER: &[&str] = &[
    "0-400",
    "400-600",
    "600-700",
    "700-800",
    "800-900",
    "900-1000",
    "1000-1100",
    "1100-1200",
    "1200-1300",
    "1300-1400",
    "1400-1500",
    "1500-1600",
    "1600-1700",
    "1700-1800",
    "1800-1900",
    "1900-2000",
    "2000-2100",
    "2100-2200",
    "2200-2300",
    "2300-2400",
    "2400+",
];

/// Rating-range bucket, e.g. `1200-1300`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DojoCohort(String);

impl DojoCohort {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Position on the ladder, `None` for cohorts outside it.
    pub fn ordinal(&self) -> Option<usize> {
        COHORT_LADDER.iter().position(|value| *value == self.0)
    }

    /// Returns the cohort one step up the ladder.
    ///
    /// The top cohort and unknown cohorts map to [`NO_COHORT`].
    pub fn next_cohort(&self) -> DojoCohort {
        match self.ordinal() {
            Some(index) => COHORT_LADDER
                .get(index + 1)
                .map_or_else(|| DojoCohort::new(NO_COHORT), |next| DojoCohort::new(*next)),
            None => DojoCohort::new(NO_COHORT),
        }
    }
}

impl Display for DojoCohort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DojoCohort {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DojoCohort, NO_COHORT};

    #[test]
    fn next_cohort_walks_the_ladder() {
        let cases = [
            ("0-400", "400-600"),
            ("400-600", "600-700"),
            ("600-700", "700-800"),
            ("1200-1300", "1300-1400"),
            ("2300-2400", "2400+"),
            ("2400+", NO_COHORT),
            ("nonexistentCohort", NO_COHORT),
        ];

        for (cohort, want) in cases {
            let got = DojoCohort::from(cohort).next_cohort();
            assert_eq!(got.as_str(), want, "next_cohort({cohort})");
        }
    }

    #[test]
    fn ordinal_is_monotonic_along_the_ladder() {
        let low = DojoCohort::from("800-900").ordinal().unwrap();
        let high = DojoCohort::from("1500-1600").ordinal().unwrap();
        assert!(low < high);
        assert_eq!(DojoCohort::from(NO_COHORT).ordinal(), None);
    }
}
