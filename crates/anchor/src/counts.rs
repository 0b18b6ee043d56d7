use std::collections::BTreeMap;

use serde::Serialize;

use crate::tree::Forest;
use crate::types::ResolvedMapping;

/// Per-paragraph comment counts derived from a [`ResolvedMapping`].
///
/// The badge count is the number of threads (root comments); replies only
/// show up in [`thread_total`](Self::thread_total).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParagraphCounts {
    roots: BTreeMap<usize, usize>,
    #[serde(skip)]
    threads: BTreeMap<usize, usize>,
}

impl ParagraphCounts {
    /// Root comments at `index`; 0 for paragraphs without comments.
    pub fn get(&self, index: usize) -> usize {
        self.roots.get(&index).copied().unwrap_or(0)
    }

    /// Root comments plus replies at `index`.
    pub fn thread_total(&self, index: usize) -> usize {
        self.threads.get(&index).copied().unwrap_or(0)
    }

    /// Root comments across the chapter.
    pub fn total(&self) -> usize {
        self.roots.values().sum()
    }

    /// `(index, roots)` pairs for paragraphs with at least one root.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.roots.iter().map(|(index, count)| (*index, *count))
    }

    pub fn as_map(&self) -> &BTreeMap<usize, usize> {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl From<ParagraphCounts> for BTreeMap<usize, usize> {
    fn from(counts: ParagraphCounts) -> Self {
        counts.roots
    }
}

/// Count threads per paragraph.
///
/// A root is a comment whose parent is absent from its bucket, the same rule
/// [`build_tree`](crate::build_tree) uses, so each badge equals the number of
/// threads the panel shows.
pub fn counts(mapping: &ResolvedMapping) -> ParagraphCounts {
    let mut result = ParagraphCounts::default();
    for (index, bucket) in mapping.iter() {
        if bucket.is_empty() {
            continue;
        }
        let roots = Forest::layout(bucket).roots.len();
        if roots > 0 {
            result.roots.insert(index, roots);
        }
        result.threads.insert(index, bucket.len());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;
    use comments::Comment;

    #[test]
    fn replies_do_not_inflate_counts() {
        let comments = vec![
            Comment::new("a", 1, None, "x"),
            Comment::reply("a1", "a", 1, "x"),
            Comment::reply("a2", "a", 1, "x"),
            Comment::new("b", 1, None, "x"),
            Comment::reply("b1", "b", 1, "x"),
        ];
        let mapping = resolve(&["p0", "p1"], &comments);
        let counts = counts(&mapping);
        assert_eq!(counts.get(1), 2);
        assert_eq!(counts.thread_total(1), 5);
        assert_eq!(counts.get(0), 0);
        assert_eq!(counts.thread_total(0), 0);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn empty_indices_omitted() {
        let comments = vec![Comment::new("a", 3, None, "x"), Comment::new("b", 0, None, "y")];
        let counts = counts(&resolve(&["p0", "p1", "p2", "p3"], &comments));
        let map: BTreeMap<usize, usize> = counts.clone().into();
        assert_eq!(map, BTreeMap::from([(0, 1), (3, 1)]));
        assert_eq!(counts.iter().count(), 2);
    }

    #[test]
    fn orphaned_reply_counts_as_root() {
        let comments = vec![Comment::reply("r", "deleted", 2, "x")];
        let counts = counts(&resolve(&["a", "b", "c"], &comments));
        assert_eq!(counts.get(2), 1);
    }

    #[test]
    fn empty_mapping() {
        let counts = counts(&ResolvedMapping::default());
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn serializes_root_counts_only() {
        let comments = vec![Comment::new("a", 0, None, "x"), Comment::reply("b", "a", 0, "y")];
        let json = serde_json::to_value(counts(&resolve(&["p"], &comments))).expect("json");
        assert_eq!(json, serde_json::json!({ "0": 1 }));
    }
}
