//! `IndexedMinHeap` — a binary min-heap with decrease-key.
//!
//! Items are dense indices `0..n` (a traversal's node positions). Every
//! item remembers its current slot in the heap, which gives O(1)
//! membership and lets `decrease_key` find an item without searching.
//! An item whose slot is `None` has been extracted (or never pushed).

/// One heap slot.
#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    item: usize,
    key: K,
}

/// A binary min-heap over item indices with per-item slot back-pointers.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<K> {
    entries: Vec<Entry<K>>,
    /// item -> slot in `entries`
    slots: Vec<Option<usize>>,
}

impl<K: PartialOrd + Copy> IndexedMinHeap<K> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), slots: Vec::new() }
    }

    pub fn with_capacity(items: usize) -> Self {
        Self {
            entries: Vec::with_capacity(items),
            slots: Vec::with_capacity(items),
        }
    }

    /// Build a heap holding item `i` with `keys[i]` for every `i`.
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let entries: Vec<Entry<K>> = keys
            .into_iter()
            .enumerate()
            .map(|(item, key)| Entry { item, key })
            .collect();
        let slots = (0..entries.len()).map(Some).collect();
        let mut heap = Self { entries, slots };
        for i in (0..heap.entries.len() / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue `item` with `key`. Returns false, changing nothing, when the
    /// item is already queued.
    pub fn push(&mut self, item: usize, key: K) -> bool {
        if item >= self.slots.len() {
            self.slots.resize(item + 1, None);
        }
        if self.slots[item].is_some() {
            return false;
        }
        let slot = self.entries.len();
        self.entries.push(Entry { item, key });
        self.slots[item] = Some(slot);
        self.sift_up(slot);
        true
    }

    /// The minimum item and its key.
    pub fn peek(&self) -> Option<(usize, K)> {
        self.entries.first().map(|e| (e.item, e.key))
    }

    /// Extract the minimum item.
    pub fn pop(&mut self) -> Option<(usize, K)> {
        self.remove_slot(0)
    }

    /// Extract `item` wherever it sits. `None` if it is not queued.
    pub fn remove(&mut self, item: usize) -> Option<K> {
        let slot = self.slot(item)?;
        self.remove_slot(slot).map(|(_, key)| key)
    }

    /// Lower `item`'s key and restore the heap by sifting up.
    ///
    /// Only sifts up, so `key` must not be larger than the current key.
    /// Returns false when the item is not queued.
    pub fn decrease_key(&mut self, item: usize, key: K) -> bool {
        let Some(slot) = self.slot(item) else {
            return false;
        };
        debug_assert!(
            !(key > self.entries[slot].key),
            "decrease_key called with a larger key",
        );
        self.entries[slot].key = key;
        self.sift_up(slot);
        true
    }

    pub fn contains(&self, item: usize) -> bool {
        self.slot(item).is_some()
    }

    pub fn slot(&self, item: usize) -> Option<usize> {
        self.slots.get(item).copied().flatten()
    }

    pub fn key(&self, item: usize) -> Option<K> {
        self.slot(item).map(|s| self.entries[s].key)
    }

    fn remove_slot(&mut self, slot: usize) -> Option<(usize, K)> {
        let last = self.entries.len().checked_sub(1)?;
        if slot > last {
            return None;
        }
        if slot != last {
            self.swap(slot, last);
        }
        let removed = self.entries.pop()?;
        self.slots[removed.item] = None;
        if slot < self.entries.len() {
            self.sift_down(slot);
            self.sift_up(slot);
        }
        Some((removed.item, removed.key))
    }

    fn sift_up(&mut self, mut node: usize) {
        while node > 0 {
            let parent = (node - 1) / 2;
            if self.less(node, parent) {
                self.swap(node, parent);
                node = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut node: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * node + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smaller = left;
            if right < len && self.less(right, left) {
                smaller = right;
            }

            if self.less(smaller, node) {
                self.swap(node, smaller);
                node = smaller;
            } else {
                break;
            }
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.entries[a].key < self.entries[b].key
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots[self.entries[a].item] = Some(a);
        self.slots[self.entries[b].item] = Some(b);
    }

    #[cfg(test)]
    fn is_heap(&self) -> bool {
        (1..self.entries.len()).all(|i| !self.less(i, (i - 1) / 2))
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(slot, e)| self.slots[e.item] == Some(slot))
    }
}

impl<K: PartialOrd + Copy> Default for IndexedMinHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pop_in_order() {
        let mut heap = IndexedMinHeap::from_keys([5.0, 1.0, 4.0, 2.0, 3.0]);
        let mut out = Vec::new();
        while let Some((item, key)) = heap.pop() {
            out.push((item, key));
        }
        assert_eq!(out, vec![(1, 1.0), (3, 2.0), (4, 3.0), (2, 4.0), (0, 5.0)]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_decrease_key_moves_to_top() {
        let mut heap = IndexedMinHeap::from_keys([10, 20, 30, 40]);
        assert!(heap.decrease_key(3, 5));
        assert_eq!(heap.peek(), Some((3, 5)));
        assert_eq!(heap.key(3), Some(5));
        assert!(heap.is_heap());
    }

    #[test]
    fn test_extracted_items_are_not_contained() {
        let mut heap = IndexedMinHeap::from_keys([3, 1, 2]);
        assert!(heap.contains(1));
        assert_eq!(heap.pop(), Some((1, 1)));
        assert!(!heap.contains(1));
        assert_eq!(heap.slot(1), None);
        assert!(!heap.decrease_key(1, 0));
        assert!(!heap.contains(42));
    }

    #[test]
    fn test_remove_from_middle() {
        let mut heap = IndexedMinHeap::from_keys([1, 8, 2, 9, 10, 3, 4]);
        assert_eq!(heap.remove(1), Some(8));
        assert_eq!(heap.remove(1), None);
        assert!(heap.is_heap());
        assert_eq!(heap.len(), 6);
    }

    #[test]
    fn test_push_twice_is_rejected() {
        let mut heap = IndexedMinHeap::new();
        assert!(heap.push(4, 2.5));
        assert!(!heap.push(4, 0.5));
        assert_eq!(heap.key(4), Some(2.5));
        assert!(!heap.contains(3));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(usize, u32),
        Decrease(usize, u32),
        Pop,
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..32, any::<u32>()).prop_map(|(i, k)| Op::Push(i, k)),
            (0usize..32, any::<u32>()).prop_map(|(i, d)| Op::Decrease(i, d)),
            Just(Op::Pop),
            (0usize..32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_heap_property_holds(ops in proptest::collection::vec(op(), 1..200)) {
            let mut heap: IndexedMinHeap<u32> = IndexedMinHeap::new();
            let mut last_popped: Option<u32> = None;

            for op in ops {
                match op {
                    Op::Push(i, k) => {
                        heap.push(i, k);
                        last_popped = None;
                    }
                    Op::Decrease(i, d) => {
                        if let Some(k) = heap.key(i) {
                            heap.decrease_key(i, k.saturating_sub(d));
                            last_popped = None;
                        }
                    }
                    Op::Pop => {
                        if let Some((item, key)) = heap.pop() {
                            prop_assert!(!heap.contains(item));
                            if let Some(prev) = last_popped {
                                prop_assert!(prev <= key);
                            }
                            last_popped = Some(key);
                        }
                    }
                    Op::Remove(i) => {
                        heap.remove(i);
                        prop_assert!(!heap.contains(i));
                    }
                }
                prop_assert!(heap.is_heap());
            }
        }
    }
}
