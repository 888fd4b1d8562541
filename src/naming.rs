//! Centralized filename parsing for the `NN--name` convention.
//!
//! Content files may carry a numeric prefix separated by a double dash
//! (`010--hello-world.md`) that fixes their position in the generated index.
//! Files without a prefix sort after all prefixed ones. This module provides
//! the single parsing function used by both the generator and the admin
//! surface, decoupled from any filesystem enumeration.

/// Result of parsing an entry name like `010--hello-world`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Ordering prefix if present (e.g. `10` from `010--hello-world`).
    pub order: Option<u64>,
    /// Name part after `NN--`. For unprefixed entries, the full input.
    pub base: String,
}

impl ParsedName {
    /// Sort key for index ordering: the explicit prefix, or a sentinel
    /// that places unprefixed entries after every prefixed one.
    pub fn sort_key(&self) -> u64 {
        self.order.unwrap_or(u64::MAX)
    }
}

/// Parse an entry name following the `NN--name` convention.
///
/// - `"010--hello"` → order=Some(10), base="hello"
/// - `"7--a--b"` → order=Some(7), base="a--b" (only the first `--` splits)
/// - `"hello"` → order=None, base="hello"
/// - `"x--hello"` → order=None, base="x--hello" (prefix must be numeric)
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once("--")
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && let Ok(order) = prefix.parse::<u64>()
    {
        return ParsedName {
            order: Some(order),
            base: rest.to_string(),
        };
    }
    ParsedName {
        order: None,
        base: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_name() {
        let p = parse_entry_name("010--hello-world");
        assert_eq!(p.order, Some(10));
        assert_eq!(p.base, "hello-world");
    }

    #[test]
    fn single_digit_prefix() {
        let p = parse_entry_name("1--first");
        assert_eq!(p.order, Some(1));
        assert_eq!(p.base, "first");
    }

    #[test]
    fn zero_prefix() {
        let p = parse_entry_name("000--origin");
        assert_eq!(p.order, Some(0));
        assert_eq!(p.base, "origin");
    }

    #[test]
    fn unprefixed_name() {
        let p = parse_entry_name("hello");
        assert_eq!(p.order, None);
        assert_eq!(p.base, "hello");
    }

    #[test]
    fn non_numeric_prefix_is_part_of_the_name() {
        let p = parse_entry_name("x--hello");
        assert_eq!(p.order, None);
        assert_eq!(p.base, "x--hello");
    }

    #[test]
    fn only_first_separator_splits() {
        let p = parse_entry_name("7--a--b");
        assert_eq!(p.order, Some(7));
        assert_eq!(p.base, "a--b");
    }

    #[test]
    fn single_dash_does_not_split() {
        let p = parse_entry_name("01-hello");
        assert_eq!(p.order, None);
        assert_eq!(p.base, "01-hello");
    }

    #[test]
    fn empty_base_after_prefix() {
        let p = parse_entry_name("12--");
        assert_eq!(p.order, Some(12));
        assert_eq!(p.base, "");
    }

    #[test]
    fn sort_key_places_unprefixed_last() {
        assert!(parse_entry_name("999--z").sort_key() < parse_entry_name("anything").sort_key());
    }
}
