//! Watch-set: which tubes get reported
//!
//! Built once from the `-tubes` flag. `*` anywhere in the list means every
//! tube, including tubes created after startup.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Token that selects every tube
pub const WILDCARD: &str = "*";

const BLANK_SPEC: &str = "watch specification can't be blank";

/// Set of watched tube names, or the wildcard.
///
/// Never empty: `parse` rejects specifications that name no tube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSet {
    /// Match every tube
    All,
    /// Match exactly these tube names
    Tubes(BTreeSet<String>),
}

impl WatchSet {
    /// Parse a comma-separated tube list.
    ///
    /// Surrounding whitespace is trimmed from the whole input and from each
    /// element; empty elements are dropped and duplicates collapse.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidConfig(BLANK_SPEC.to_string()));
        }

        let mut tubes = BTreeSet::new();
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == WILDCARD {
                return Ok(WatchSet::All);
            }
            tubes.insert(name.to_string());
        }

        if tubes.is_empty() {
            return Err(Error::InvalidConfig(BLANK_SPEC.to_string()));
        }
        Ok(WatchSet::Tubes(tubes))
    }

    /// Whether stats for `name` should be collected
    pub fn is_watched(&self, name: &str) -> bool {
        match self {
            WatchSet::All => true,
            WatchSet::Tubes(tubes) => tubes.contains(name),
        }
    }

}

impl Default for WatchSet {
    fn default() -> Self {
        WatchSet::All
    }
}

impl FromStr for WatchSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for WatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchSet::All => write!(f, "{}", WILDCARD),
            WatchSet::Tubes(tubes) => {
                let names: Vec<&str> = tubes.iter().map(String::as_str).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // parse Tests
    // =========================================================================

    #[test]
    fn test_parse_blank_is_invalid() {
        for raw in ["", "   ", ",  ,", " , ,, "] {
            assert_matches!(
                WatchSet::parse(raw),
                Err(Error::InvalidConfig(msg)) if msg == "watch specification can't be blank",
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(WatchSet::parse("*").unwrap(), WatchSet::All);
        assert_eq!(WatchSet::parse("  *  ").unwrap(), WatchSet::All);
    }

    #[test]
    fn test_parse_wildcard_inside_list_matches_all() {
        assert_eq!(WatchSet::parse("emails, *").unwrap(), WatchSet::All);
    }

    #[test]
    fn test_parse_trims_elements() {
        let watch = WatchSet::parse("a, b ,c").unwrap();
        assert_eq!(watch, WatchSet::Tubes(set(&["a", "b", "c"])));
    }

    #[test]
    fn test_parse_collapses_duplicates_and_empties() {
        let watch = WatchSet::parse("jobs,,jobs , mail,").unwrap();
        assert_eq!(watch, WatchSet::Tubes(set(&["jobs", "mail"])));
    }

    #[test]
    fn test_parse_accepts_arbitrary_names() {
        let watch = WatchSet::parse("a.b$c(1), x-y_z").unwrap();
        assert!(watch.is_watched("a.b$c(1)"));
        assert!(watch.is_watched("x-y_z"));
    }

    #[test]
    fn test_from_str() {
        let watch: WatchSet = "default".parse().unwrap();
        assert!(watch.is_watched("default"));
        assert!("".parse::<WatchSet>().is_err());
    }

    // =========================================================================
    // is_watched Tests
    // =========================================================================

    #[test]
    fn test_is_watched_exact_match_only() {
        let watch = WatchSet::parse("emails").unwrap();
        assert!(watch.is_watched("emails"));
        assert!(!watch.is_watched("email"));
        assert!(!watch.is_watched("emails2"));
        assert!(!watch.is_watched(""));
    }

    #[test]
    fn test_default_watches_everything() {
        assert!(WatchSet::default().is_watched("anything"));
    }

    #[test]
    fn test_display() {
        assert_eq!(WatchSet::All.to_string(), "*");
        assert_eq!(WatchSet::parse("b, a").unwrap().to_string(), "a,b");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_wildcard_watches_any_name(
            names in proptest::collection::vec("[a-z0-9_-]{1,12}", 0..5),
            probe in ".*",
        ) {
            let mut elements = names.clone();
            elements.push(WILDCARD.to_string());
            let watch = WatchSet::parse(&elements.join(",")).unwrap();
            prop_assert!(watch.is_watched(&probe));
        }

        #[test]
        fn prop_list_round_trips_through_trim(
            names in proptest::collection::btree_set("[a-z0-9_-]{1,12}", 1..6),
        ) {
            let raw = names
                .iter()
                .map(|n| format!("  {} ", n))
                .collect::<Vec<_>>()
                .join(",");
            let watch = WatchSet::parse(&raw).unwrap();
            prop_assert_eq!(&watch, &WatchSet::Tubes(names.clone()));
            for name in &names {
                prop_assert!(watch.is_watched(name));
            }
        }
    }
}
