use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const PREFIX: &str = "slide-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("fragment is empty")]
    Empty,
    #[error("fragment does not start with `{PREFIX}`: {0:?}")]
    MissingPrefix(String),
    #[error("invalid slide number in fragment: {0:?}")]
    InvalidNumber(String),
}

/// A 1-based slide reference as carried in the address fragment
/// (`slide-3`, optionally written `#slide-3`).
///
/// Parsing is strict: everything after `slide-` must be ASCII digits. A
/// lenient leading-integer read would take `#slide-3x` as slide 3 and
/// `#slide- 4` as slide 4; both are rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideFragment(pub usize);

impl SlideFragment {
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Resolve to a 0-based index, if the slide exists in a deck of `count`.
    pub fn to_index(self, count: usize) -> Option<usize> {
        (1..=count).contains(&self.0).then(|| self.0 - 1)
    }
}

impl fmt::Display for SlideFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for SlideFragment {
    type Err = FragmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.is_empty() {
            return Err(FragmentError::Empty);
        }
        let digits = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| FragmentError::MissingPrefix(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FragmentError::InvalidNumber(digits.to_string()));
        }
        digits
            .parse()
            .map(SlideFragment)
            .map_err(|_| FragmentError::InvalidNumber(digits.to_string()))
    }
}

/// The page location's fragment, stored without the leading `#`.
pub trait Location {
    fn fragment(&self) -> &str;

    fn set_fragment(&mut self, fragment: &str);
}

/// In-memory location with browser-style back/forward history.
///
/// Writing a fragment never reports a change by itself; only moving through
/// history or navigating to a typed fragment does, and that is when the host
/// should deliver `fragment_changed` to the controller.
#[derive(Debug, Clone)]
pub struct HistoryLocation {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![strip_hash(initial).to_string()],
            cursor: 0,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back one entry. Returns whether the fragment changed.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        self.entries[self.cursor] != self.entries[self.cursor + 1]
    }

    /// Step forward one entry. Returns whether the fragment changed.
    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        self.entries[self.cursor] != self.entries[self.cursor - 1]
    }

    /// Navigate to a fragment typed by the user. Returns whether it differs
    /// from the current one.
    pub fn navigate(&mut self, fragment: &str) -> bool {
        let changed = strip_hash(fragment) != self.fragment();
        self.set_fragment(fragment);
        changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for HistoryLocation {
    fn fragment(&self) -> &str {
        &self.entries[self.cursor]
    }

    fn set_fragment(&mut self, fragment: &str) {
        let fragment = strip_hash(fragment);
        if fragment == self.fragment() {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor += 1;
    }
}

fn strip_hash(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(SlideFragment::from_index(0).to_string(), "slide-1");
        assert_eq!(SlideFragment::from_index(4).to_string(), "slide-5");
    }

    #[test]
    fn test_parse_with_and_without_hash() {
        assert_eq!("#slide-3".parse(), Ok(SlideFragment(3)));
        assert_eq!("slide-12".parse(), Ok(SlideFragment(12)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<SlideFragment>(), Err(FragmentError::Empty));
        assert_eq!("#".parse::<SlideFragment>(), Err(FragmentError::Empty));
        assert!(matches!(
            "#page-2".parse::<SlideFragment>(),
            Err(FragmentError::MissingPrefix(_))
        ));
        for bad in ["#slide-abc", "#slide-", "#slide--1", "#slide-+2", "#slide-3x", "#slide- 4"] {
            assert!(
                matches!(
                    bad.parse::<SlideFragment>(),
                    Err(FragmentError::InvalidNumber(_))
                ),
                "{bad} should not parse"
            );
        }
        assert!("#slide-99999999999999999999999".parse::<SlideFragment>().is_err());
    }

    #[test]
    fn test_to_index_bounds() {
        assert_eq!(SlideFragment(0).to_index(5), None);
        assert_eq!(SlideFragment(1).to_index(5), Some(0));
        assert_eq!(SlideFragment(5).to_index(5), Some(4));
        assert_eq!(SlideFragment(6).to_index(5), None);
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut location = HistoryLocation::new("#slide-1");
        assert_eq!(location.fragment(), "slide-1");
        location.set_fragment("slide-2");
        location.set_fragment("slide-3");
        assert_eq!(location.len(), 3);

        assert!(location.back());
        assert_eq!(location.fragment(), "slide-2");
        assert!(location.back());
        assert_eq!(location.fragment(), "slide-1");
        assert!(!location.back());

        assert!(location.forward());
        assert_eq!(location.fragment(), "slide-2");
    }

    #[test]
    fn test_history_set_drops_forward_entries() {
        let mut location = HistoryLocation::new("slide-1");
        location.set_fragment("slide-2");
        location.set_fragment("slide-3");
        location.back();
        location.set_fragment("slide-5");
        assert!(!location.can_go_forward());
        assert_eq!(location.len(), 3);
    }

    #[test]
    fn test_history_same_fragment_is_not_a_new_entry() {
        let mut location = HistoryLocation::new("slide-1");
        location.set_fragment("#slide-1");
        assert_eq!(location.len(), 1);
        assert!(!location.navigate("slide-1"));
        assert!(location.navigate("slide-4"));
        assert_eq!(location.fragment(), "slide-4");
    }
}
