// Filtered views - round/class criteria over the entry collection
//
// Filtering derives a view; it never mutates the underlying table.

use crate::entry::Entry;
use serde::{Deserialize, Serialize};

/// Exact-match criteria for the filtered view.
///
/// An empty string means "no filter on this field". Both criteria must
/// hold for an entry to pass when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub round: String,
    pub share_class: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        FilterCriteria::default()
    }

    /// True when at least one criterion is set
    pub fn is_active(&self) -> bool {
        !self.round.is_empty() || !self.share_class.is_empty()
    }

    /// Drop all criteria
    pub fn clear(&mut self) {
        self.round.clear();
        self.share_class.clear();
    }

    /// Does this entry pass every active criterion?
    pub fn matches(&self, entry: &Entry) -> bool {
        (self.round.is_empty() || entry.round == self.round)
            && (self.share_class.is_empty() || entry.share_class == self.share_class)
    }

    /// Order-preserving subsequence of entries passing the criteria
    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}
