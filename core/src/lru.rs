//! Fixed-capacity least-recently-used cache.
//!
//! Entries live in a slab of nodes linked into a doubly linked list by index,
//! most recently used at the head. A hash map gives O(1) key → slot lookup.
//! Slots 0 and 1 are permanent head and tail sentinels; they carry no entry
//! and are never handed out.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Result, SearchError};

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SearchError::InvalidCapacity);
        }
        let nodes = vec![
            Node { entry: None, prev: HEAD, next: TAIL },
            Node { entry: None, prev: HEAD, next: TAIL },
        ];
        Ok(Self { capacity, map: HashMap::with_capacity(capacity), nodes, free: Vec::new() })
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.detach(idx);
        self.attach_front(idx);
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    /// Look up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|(_, v)| v)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or update `key` as most recently used. Returns the entry
    /// evicted to stay within capacity, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some((_, v)) = self.nodes[idx].entry.as_mut() {
                *v = value;
            }
            self.detach(idx);
            self.attach_front(idx);
            return None;
        }

        let node = Node { entry: Some((key.clone(), value)), prev: HEAD, next: HEAD };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.attach_front(idx);
        self.map.insert(key, idx);

        if self.map.len() > self.capacity {
            return self.evict_tail();
        }
        None
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.free.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<&K> {
        let mut out = Vec::with_capacity(self.map.len());
        let mut idx = self.nodes[HEAD].next;
        while idx != TAIL {
            if let Some((k, _)) = self.nodes[idx].entry.as_ref() {
                out.push(k);
            }
            idx = self.nodes[idx].next;
        }
        out
    }

    fn evict_tail(&mut self) -> Option<(K, V)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.detach(idx);
        let (k, v) = self.nodes[idx].entry.take()?;
        self.map.remove(&k);
        self.free.push(idx);
        Some((k, v))
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn attach_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}
