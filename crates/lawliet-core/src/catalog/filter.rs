// ── Catalog filter predicates ──

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::RecoveredFile;

/// Sentinel that selects every value.
pub const ALL: &str = "all";

/// Either every value, or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    /// Exact match; `All` matches everything, including a missing value.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    /// `"all"` and the empty string select everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.to_owned()))
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(value) => f.write_str(value),
        }
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.to_string()
    }
}

/// Type and source filters applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub type_filter: Filter,
    pub source_filter: Filter,
}

impl FilterState {
    pub fn new(type_filter: Filter, source_filter: Filter) -> Self {
        Self {
            type_filter,
            source_filter,
        }
    }

    pub fn matches(&self, file: &RecoveredFile) -> bool {
        self.type_filter.matches(Some(&file.format))
            && self.source_filter.matches(file.source.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_parses_to_all() {
        assert_eq!("all".parse::<Filter>(), Ok(Filter::All));
        assert_eq!("".parse::<Filter>(), Ok(Filter::All));
        assert_eq!("jpeg".parse::<Filter>(), Ok(Filter::Only("jpeg".into())));
    }

    #[test]
    fn only_matches_exactly() {
        let filter = Filter::Only("jpeg".into());
        assert!(filter.matches(Some("jpeg")));
        assert!(!filter.matches(Some("JPEG")));
        assert!(!filter.matches(Some("jpg")));
        assert!(!filter.matches(None));
        assert!(Filter::All.matches(None));
    }

    #[test]
    fn display_round_trips_the_sentinel() {
        assert_eq!(Filter::All.to_string(), "all");
        assert_eq!(Filter::Only("disk1.img".into()).to_string(), "disk1.img");
    }
}
