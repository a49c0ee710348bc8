//! Prefix tree over indexed terms, used for autocomplete.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    // Ordered so that traversal, and therefore tie-breaking, is lexical.
    children: BTreeMap<char, TrieNode>,
    is_terminal: bool,
    frequency: u32,
}

impl TrieNode {
    fn is_useless(&self) -> bool {
        !self.is_terminal && self.children.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: TrieNode,
    terms: usize,
}

impl Trie {
    pub fn new() -> Self { Self::default() }

    /// Insert one occurrence of `term`, creating its path as needed.
    pub fn insert(&mut self, term: &str) {
        let term = term.to_lowercase();
        let mut node = &mut self.root;
        for ch in term.chars() {
            node = node.children.entry(ch).or_default();
        }
        if !node.is_terminal {
            node.is_terminal = true;
            self.terms += 1;
        }
        node.frequency += 1;
    }

    /// Whether `term` itself was inserted.
    pub fn contains(&self, term: &str) -> bool {
        self.find(&term.to_lowercase()).map_or(false, |n| n.is_terminal)
    }

    /// Whether any inserted term begins with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.find(&prefix.to_lowercase()).is_some()
    }

    pub fn frequency(&self, term: &str) -> u32 {
        match self.find(&term.to_lowercase()) {
            Some(n) if n.is_terminal => n.frequency,
            _ => 0,
        }
    }

    /// Terms under `prefix`, most frequent first, truncated to `limit`.
    /// Equal frequencies keep traversal (lexical) order.
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> Vec<(String, u32)> {
        if limit == 0 {
            return Vec::new();
        }
        let prefix = prefix.to_lowercase();
        let Some(start) = self.find(&prefix) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut buf = prefix;
        collect(start, &mut buf, &mut found);
        // stable sort keeps discovery order among ties
        found.sort_by(|a, b| b.1.cmp(&a.1));
        found.truncate(limit);
        found
    }

    /// Remove `term` and prune nodes left with no terminal descendants.
    /// Returns whether anything was removed.
    pub fn delete(&mut self, term: &str) -> bool {
        let chars: Vec<char> = term.to_lowercase().chars().collect();
        let removed = delete_rec(&mut self.root, &chars);
        if removed {
            self.terms -= 1;
        }
        removed
    }

    /// Take back one occurrence of `term`. The term is deleted once its
    /// frequency reaches zero. Returns whether the term was present.
    pub fn decrement(&mut self, term: &str) -> bool {
        let term = term.to_lowercase();
        let exhausted = match self.find_mut(&term) {
            Some(node) if node.is_terminal => {
                node.frequency = node.frequency.saturating_sub(1);
                node.frequency == 0
            }
            _ => return false,
        };
        if exhausted {
            self.delete(&term);
        }
        true
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.terms }

    pub fn is_empty(&self) -> bool { self.terms == 0 }

    pub fn clear(&mut self) {
        self.root = TrieNode::default();
        self.terms = 0;
    }

    fn find(&self, path: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in path.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut TrieNode> {
        let mut node = &mut self.root;
        for ch in path.chars() {
            node = node.children.get_mut(&ch)?;
        }
        Some(node)
    }
}

// Recursion depth is bounded by term length.
fn collect(node: &TrieNode, buf: &mut String, out: &mut Vec<(String, u32)>) {
    if node.is_terminal {
        out.push((buf.clone(), node.frequency));
    }
    for (ch, child) in &node.children {
        buf.push(*ch);
        collect(child, buf, out);
        buf.pop();
    }
}

fn delete_rec(node: &mut TrieNode, rest: &[char]) -> bool {
    let Some((first, tail)) = rest.split_first() else {
        if !node.is_terminal {
            return false;
        }
        node.is_terminal = false;
        node.frequency = 0;
        return true;
    };
    let Some(child) = node.children.get_mut(first) else {
        return false;
    };
    let removed = delete_rec(child, tail);
    if removed && child.is_useless() {
        node.children.remove(first);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(v: Vec<(String, u32)>) -> Vec<String> {
        v.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn insert_and_lookup() {
        let mut trie = Trie::new();
        trie.insert("Rust");
        assert!(trie.contains("rust"));
        assert!(!trie.contains("ru"));
        assert!(trie.starts_with("ru"));
        assert!(!trie.starts_with("go"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn frequency_accumulates() {
        let mut trie = Trie::new();
        trie.insert("cat");
        trie.insert("cat");
        assert_eq!(trie.frequency("cat"), 2);
        assert_eq!(trie.frequency("ca"), 0);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn autocomplete_ranks_by_frequency() {
        let mut trie = Trie::new();
        for _ in 0..3 {
            trie.insert("cat");
        }
        trie.insert("car");
        trie.insert("cart");
        trie.insert("dog");
        assert_eq!(terms(trie.autocomplete("ca", 2)), vec!["cat", "car"]);
        assert_eq!(terms(trie.autocomplete("ca", 10)), vec!["cat", "car", "cart"]);
    }

    #[test]
    fn autocomplete_ties_are_lexical() {
        let mut trie = Trie::new();
        for t in ["beta", "bravo", "bat"] {
            trie.insert(t);
        }
        assert_eq!(terms(trie.autocomplete("b", 5)), vec!["bat", "beta", "bravo"]);
    }

    #[test]
    fn autocomplete_missing_prefix_is_empty() {
        let mut trie = Trie::new();
        trie.insert("cat");
        assert!(trie.autocomplete("x", 5).is_empty());
        assert!(trie.autocomplete("c", 0).is_empty());
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let mut trie = Trie::new();
        trie.insert("a");
        trie.insert("b");
        assert_eq!(trie.autocomplete("", 10).len(), 2);
    }

    #[test]
    fn delete_prunes_dead_branches() {
        let mut trie = Trie::new();
        trie.insert("car");
        trie.insert("cart");
        assert!(trie.delete("cart"));
        assert!(!trie.starts_with("cart"));
        assert!(trie.contains("car"));
        assert!(trie.delete("car"));
        assert!(!trie.starts_with("c"));
        assert!(trie.is_empty());
    }

    #[test]
    fn delete_keeps_longer_terms() {
        let mut trie = Trie::new();
        trie.insert("car");
        trie.insert("cart");
        assert!(trie.delete("car"));
        assert!(!trie.contains("car"));
        assert!(trie.contains("cart"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn delete_missing_is_noop() {
        let mut trie = Trie::new();
        trie.insert("car");
        assert!(!trie.delete("ca"));
        assert!(!trie.delete("cars"));
        assert!(trie.contains("car"));
    }

    #[test]
    fn decrement_removes_at_zero() {
        let mut trie = Trie::new();
        trie.insert("cat");
        trie.insert("cat");
        assert!(trie.decrement("cat"));
        assert_eq!(trie.frequency("cat"), 1);
        assert!(trie.decrement("cat"));
        assert!(!trie.contains("cat"));
        assert!(!trie.decrement("cat"));
    }
}
