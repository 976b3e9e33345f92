//! Bounded top-K selection over a stream of candidates.
//!
//! `BoundedTopK` keeps at most K items in a `BinaryHeap` whose root is the
//! worst item currently retained. Entries are ordered by a comparator value
//! supplied at construction (`Less` = ranks ahead) and carried by every
//! entry, so the same structure serves any ranking direction.
//!
//! Once full, a candidate is admitted only if it strictly outranks the root;
//! the root is evicted in the same step. Each offer costs O(log K) and memory
//! stays O(K) however long the stream is. With a strict total order the
//! retained set is exactly the K best candidates, whatever the arrival order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::num::NonZeroUsize;

/// Outcome of offering a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Offer<T> {
    /// Added while below capacity.
    Inserted,
    /// Admitted at capacity; carries the evicted former worst item.
    Replaced(T),
    /// Not better than the current worst; handed back unchanged.
    Rejected(T),
}

impl<T> Offer<T> {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

// Heap entry ordered by rank: the max-heap root is the worst item.
struct Ranked<T, C> {
    item: T,
    cmp: C,
}

impl<T, C> PartialEq for Ranked<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn eq(&self, other: &Self) -> bool {
        (self.cmp)(&self.item, &other.item) == Ordering::Equal
    }
}

impl<T, C> Eq for Ranked<T, C> where C: Fn(&T, &T) -> Ordering {}

impl<T, C> PartialOrd for Ranked<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, C> Ord for Ranked<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn cmp(&self, other: &Self) -> Ordering {
        (self.cmp)(&self.item, &other.item)
    }
}

/// Size-bounded heap keeping the K best items under a comparator.
pub struct BoundedTopK<T, C>
where
    C: Fn(&T, &T) -> Ordering + Copy,
{
    heap: BinaryHeap<Ranked<T, C>>,
    capacity: usize,
    cmp: C,
}

impl<T, C> BoundedTopK<T, C>
where
    C: Fn(&T, &T) -> Ordering + Copy,
{
    /// `cmp(a, b) == Less` must mean `a` ranks ahead of `b`.
    pub fn new(k: NonZeroUsize, cmp: C) -> Self {
        let capacity = k.get();
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            capacity,
            cmp,
        }
    }

    pub fn offer(&mut self, item: T) -> Offer<T> {
        if self.heap.len() < self.capacity {
            self.heap.push(Ranked { item, cmp: self.cmp });
            return Offer::Inserted;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if (self.cmp)(&item, &worst.item) == Ordering::Less => {
                // PeekMut restores the heap order when dropped.
                Offer::Replaced(std::mem::replace(&mut worst.item, item))
            }
            _ => Offer::Rejected(item),
        }
    }

    /// The worst retained item, i.e. the next eviction victim.
    pub fn worst(&self) -> Option<&T> {
        self.heap.peek().map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    /// Consume the selector and return the retained items best first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.heap.into_sorted_vec().into_iter().map(|e| e.item).collect()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for BoundedTopK<T, C>
where
    C: Fn(&T, &T) -> Ordering + Copy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<&T> = self.heap.iter().map(|e| &e.item).collect();
        f.debug_struct("BoundedTopK")
            .field("capacity", &self.capacity)
            .field("heap", &items)
            .finish()
    }
}
