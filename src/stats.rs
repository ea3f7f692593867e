//! Summary figures over priced items

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::models::PricedItem;

/// An extreme value and the display name of the item holding it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub value: f64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub count: usize,
    pub total_value: f64,
    pub min: Option<Extreme>,
    pub max: Option<Extreme>,
}

impl InventoryStats {
    /// Reduces items to count, sum and extremes. On ties the first item
    /// reaching the extreme value keeps its name.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a PricedItem>,
    {
        let mut stats = Self::default();

        for item in items {
            stats.count += 1;
            stats.total_value += item.value;

            if stats.min.as_ref().map_or(true, |min| item.value < min.value) {
                stats.min = Some(Extreme {
                    value: item.value,
                    name: item.name.clone(),
                });
            }

            if stats.max.as_ref().map_or(true, |max| item.value > max.value) {
                stats.max = Some(Extreme {
                    value: item.value,
                    name: item.name.clone(),
                });
            }
        }

        stats
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Heap entry ordered by value, then by earlier position winning ties
struct Ranked<'a> {
    value: f64,
    position: Reverse<usize>,
    item: &'a PricedItem,
}

impl Ranked<'_> {
    fn rank(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

/// The `n` most valuable items, highest first; equal values keep input order.
///
/// Keeps a min-heap of at most `n` entries, so the cost is O(len · log n).
pub fn top_items(items: &[PricedItem], n: usize) -> Vec<&PricedItem> {
    if n == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked<'_>>> = BinaryHeap::with_capacity(n + 1);

    for (position, item) in items.iter().enumerate() {
        let candidate = Ranked {
            value: item.value,
            position: Reverse(position),
            item,
        };

        if heap.len() < n {
            heap.push(Reverse(candidate));
            continue;
        }

        let beats_weakest = heap
            .peek()
            .is_some_and(|Reverse(weakest)| candidate > *weakest);
        if beats_weakest {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| ranked.item)
        .collect()
}
