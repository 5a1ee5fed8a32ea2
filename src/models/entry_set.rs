//! Deduplicated, insertion ordered sets of CIDR entries.

use super::{cidr, AddressFamily};
use crate::error::SyncError;
use std::collections::HashSet;
use std::path::Path;

/// CIDR strings for one address family.
///
/// No duplicates, iteration follows first-seen order. Identity is the exact
/// string, `10.0.0.0/24` and `10.0.0.1/24` are different entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl EntrySet {
    pub fn new() -> EntrySet {
        EntrySet::default()
    }

    /// Add an entry. Returns false if it was already present.
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        if self.seen.contains(&entry) {
            return false;
        }
        self.seen.insert(entry.clone());
        self.order.push(entry);
        true
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.seen.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    /// Entries in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }
}

impl<S: Into<String>> FromIterator<S> for EntrySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = EntrySet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// The desired entries of both families, as read from one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilySets {
    pub ipv4: EntrySet,
    pub ipv6: EntrySet,
}

impl FamilySets {
    pub fn get(&self, family: AddressFamily) -> &EntrySet {
        match family {
            AddressFamily::V4 => &self.ipv4,
            AddressFamily::V6 => &self.ipv6,
        }
    }
}

/// Split text into per-family entry sets, one CIDR per line.
///
/// Lines are trimmed. Blank lines and lines that are not CIDR notation are
/// skipped without an error.
pub fn parse_entry_sets(text: &str) -> FamilySets {
    let mut sets = FamilySets::default();
    let mut skipped = 0usize;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match cidr::classify(line) {
            Some(AddressFamily::V4) => {
                sets.ipv4.insert(line);
            }
            Some(AddressFamily::V6) => {
                sets.ipv6.insert(line);
            }
            None => skipped += 1,
        }
    }

    log::debug!(
        "parsed ipv4={} ipv6={} skipped={skipped}",
        sets.ipv4.len(),
        sets.ipv6.len()
    );
    sets
}

/// Read the input file and split it into per-family entry sets.
pub fn read_entry_sets(path: &Path) -> Result<FamilySets, SyncError> {
    let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Reading CIDR entries from {}", path.display());
    Ok(parse_entry_sets(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_dedups_and_keeps_order() {
        let mut set = EntrySet::new();
        assert!(set.insert("10.0.0.0/24"));
        assert!(set.insert("10.0.1.0/24"));
        assert!(!set.insert("10.0.0.0/24"), "duplicate must be rejected");
        assert!(set.insert("10.0.0.0/8"));
        assert_eq!(
            set.as_slice(),
            &["10.0.0.0/24", "10.0.1.0/24", "10.0.0.0/8"],
            "first-seen order"
        );
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_entry_sets_mixed() {
        let text = "10.0.0.0/24\n10.0.0.0/24\n2001:db8::/32\nnot-a-cidr\n\n";
        let sets = parse_entry_sets(text);
        assert_eq!(sets.ipv4.as_slice(), &["10.0.0.0/24"]);
        assert_eq!(sets.ipv6.as_slice(), &["2001:db8::/32"]);
    }

    #[test]
    fn test_parse_entry_sets_trims_lines() {
        let text = "  10.1.0.0/16 \r\n\t2001:db8:1::/48\n   \n10.1.0.0/16";
        let sets = parse_entry_sets(text);
        assert_eq!(sets.ipv4.as_slice(), &["10.1.0.0/16"]);
        assert_eq!(sets.ipv6.as_slice(), &["2001:db8:1::/48"]);
    }

    #[test]
    fn test_parse_entry_sets_exact_string_identity() {
        let sets = parse_entry_sets("10.0.0.0/24\n10.0.0.1/24\n");
        assert_eq!(sets.ipv4.len(), 2, "equivalent networks are not merged");
    }

    #[test]
    fn test_read_entry_sets_file() {
        let sets = read_entry_sets(Path::new("src/tests/test_data/cidrs_01.txt"))
            .expect("Error reading test cidr file");
        assert_eq!(sets.ipv4.len(), 4);
        assert_eq!(sets.ipv6.len(), 2);
        assert_eq!(sets.ipv4.as_slice()[0], "10.0.0.0/24");
    }

    #[test]
    fn test_read_entry_sets_missing_file() {
        let err = read_entry_sets(Path::new("src/tests/test_data/does_not_exist.txt"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
