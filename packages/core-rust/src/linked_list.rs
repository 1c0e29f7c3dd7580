//! Ordered node store: a named, doubly-linked sequence.
//!
//! Nodes live in an arena owned by the list and refer to their neighbours by
//! slot index, so the structure needs neither `unsafe` nor shared ownership.
//! Unlinking a node releases its slot for reuse.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Index;

/// Slot index of a neighbouring node, `None` at either end of the list.
type Link = Option<usize>;

struct Node<E> {
    item: E,
    prev: Link,
    next: Link,
}

// ---------------------------------------------------------------------------
// LinkedList
// ---------------------------------------------------------------------------

/// A named doubly-linked list with positional and identity-based access.
///
/// Invariants: the first node has no predecessor, the last node has no
/// successor, and walking forward from `first` visits exactly `len()` items in
/// the reverse order of walking backward from `last`.
pub struct LinkedList<E> {
    name: String,
    slots: Vec<Option<Node<E>>>,
    free: Vec<usize>,
    first: Link,
    last: Link,
    size: usize,
}

impl<E> LinkedList<E> {
    /// Create an empty list with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            free: Vec::new(),
            first: None,
            last: None,
            size: 0,
        }
    }

    /// The name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of elements currently linked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Append an element at the tail.
    pub fn add(&mut self, item: E) {
        self.link_last(item);
    }

    /// Prepend an element at the head.
    pub fn add_first(&mut self, item: E) {
        self.link_first(item);
    }

    /// Append an element at the tail. Same as [`LinkedList::add`].
    pub fn add_last(&mut self, item: E) {
        self.link_last(item);
    }

    /// Remove the first element equal to `item`. Returns whether one was found.
    pub fn remove(&mut self, item: &E) -> bool
    where
        E: PartialEq,
    {
        self.remove_by(|candidate| candidate == item).is_some()
    }

    /// Remove and return the first element matching `predicate`.
    pub fn remove_by(&mut self, predicate: impl FnMut(&E) -> bool) -> Option<E> {
        let slot = self.find_slot(predicate)?;
        self.unlink(slot)
    }

    /// Whether any element equals `item`.
    pub fn contains(&self, item: &E) -> bool
    where
        E: PartialEq,
    {
        self.iter().any(|candidate| candidate == item)
    }

    /// Element at `index`, walking from whichever end is nearer.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&E> {
        let slot = self.slot_at(index)?;
        self.node(slot).map(|node| &node.item)
    }

    #[must_use]
    pub fn first(&self) -> Option<&E> {
        self.first.and_then(|slot| self.node(slot)).map(|node| &node.item)
    }

    #[must_use]
    pub fn last(&self) -> Option<&E> {
        self.last.and_then(|slot| self.node(slot)).map(|node| &node.item)
    }

    /// Iterate from head to tail. The iterator is double-ended.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            list: self,
            front: self.first,
            back: self.last,
            remaining: self.size,
        }
    }

    // -- linking ------------------------------------------------------------

    fn link_first(&mut self, item: E) {
        let old_first = self.first;
        let slot = self.alloc(Node {
            item,
            prev: None,
            next: old_first,
        });
        match old_first {
            Some(next) => self.set_prev(next, Some(slot)),
            None => self.last = Some(slot),
        }
        self.first = Some(slot);
        self.size += 1;
    }

    fn link_last(&mut self, item: E) {
        let old_last = self.last;
        let slot = self.alloc(Node {
            item,
            prev: old_last,
            next: None,
        });
        match old_last {
            Some(prev) => self.set_next(prev, Some(slot)),
            None => self.first = Some(slot),
        }
        self.last = Some(slot);
        self.size += 1;
    }

    /// Detach the node in `slot`, repair its neighbours and release the slot.
    fn unlink(&mut self, slot: usize) -> Option<E> {
        let node = self.slots.get_mut(slot)?.take()?;
        match node.prev {
            Some(prev) => self.set_next(prev, node.next),
            None => self.first = node.next,
        }
        match node.next {
            Some(next) => self.set_prev(next, node.prev),
            None => self.last = node.prev,
        }
        self.free.push(slot);
        self.size -= 1;
        Some(node.item)
    }

    fn alloc(&mut self, node: Node<E>) -> usize {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(node);
            slot
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    fn set_prev(&mut self, slot: usize, prev: Link) {
        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, slot: usize, next: Link) {
        if let Some(node) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            node.next = next;
        }
    }

    // -- lookup -------------------------------------------------------------

    fn node(&self, slot: usize) -> Option<&Node<E>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn find_slot(&self, mut predicate: impl FnMut(&E) -> bool) -> Link {
        let mut cursor = self.first;
        while let Some(slot) = cursor {
            let node = self.node(slot)?;
            if predicate(&node.item) {
                return Some(slot);
            }
            cursor = node.next;
        }
        None
    }

    fn slot_at(&self, index: usize) -> Link {
        if index >= self.size {
            return None;
        }
        if index < (self.size >> 1) {
            let mut cursor = self.first;
            for _ in 0..index {
                cursor = self.node(cursor?)?.next;
            }
            cursor
        } else {
            let mut cursor = self.last;
            for _ in (index + 1)..self.size {
                cursor = self.node(cursor?)?.prev;
            }
            cursor
        }
    }
}

impl<E> Index<usize> for LinkedList<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index out of bounds: list `{}` has {} elements but the index is {}",
                self.name, self.size, index
            ),
        }
    }
}

impl<E> Extend<E> for LinkedList<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for item in iter {
            self.link_last(item);
        }
    }
}

impl<'a, E> IntoIterator for &'a LinkedList<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E> fmt::Debug for LinkedList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedList")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Iter
// ---------------------------------------------------------------------------

/// Borrowing iterator over a [`LinkedList`], head to tail.
pub struct Iter<'a, E> {
    list: &'a LinkedList<E>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for Iter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.item)
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
