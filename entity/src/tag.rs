use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Genre or category offered by a source. Identity is the `key`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MangaTag {
    pub key: String,
    pub title: String,
    pub source: String,
}

impl MangaTag {
    pub fn new(key: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            source: source.into(),
        }
    }
}

/// Collect tags into a set, keeping the first tag seen for each key.
pub fn unique_tags<I>(tags: I) -> BTreeSet<MangaTag>
where
    I: IntoIterator<Item = MangaTag>,
{
    let mut set = BTreeSet::new();
    for tag in tags {
        set.insert(tag);
    }
    set
}

impl PartialEq for MangaTag {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for MangaTag {}

impl PartialOrd for MangaTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MangaTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for MangaTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
