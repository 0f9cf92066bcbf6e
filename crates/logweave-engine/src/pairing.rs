use std::collections::HashMap;

/// In-flight calls of one correlation relation, keyed by call id.
///
/// Insertion order is remembered so unresolved calls can be drained, or the
/// oldest taken, in the order they were issued. Re-inserting an id replaces
/// its value but keeps its original position.
#[derive(Debug)]
pub struct PendingTable<T> {
    entries: HashMap<String, (u64, T)>,
    next_seq: u64,
}

impl<T> Default for PendingTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Register a call. Returns the value it replaced, if any.
    pub fn insert(&mut self, id: impl Into<String>, value: T) -> Option<T> {
        let id = id.into();
        if let Some((_, slot)) = self.entries.get_mut(&id) {
            return Some(std::mem::replace(slot, value));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(id, (seq, value));
        None
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolve a call by id
    pub fn take(&mut self, id: &str) -> Option<T> {
        self.entries.remove(id).map(|(_, value)| value)
    }

    /// Resolve the earliest registered call
    pub fn take_oldest(&mut self) -> Option<(String, T)> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, (seq, _))| *seq)
            .map(|(id, _)| id.clone())?;
        self.entries
            .remove_entry(&oldest)
            .map(|(id, (_, value))| (id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every unresolved call, oldest first
    pub fn drain_ordered(&mut self) -> Vec<(String, T)> {
        let mut drained: Vec<(u64, String, T)> = self
            .entries
            .drain()
            .map(|(id, (seq, value))| (seq, id, value))
            .collect();
        drained.sort_by_key(|(seq, _, _)| *seq);
        drained
            .into_iter()
            .map(|(_, id, value)| (id, value))
            .collect()
    }
}
