// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A lookup key is distinct from the ID type. This allows the lookup key
/// to not require ownership of the underlying ID data, which could require
/// allocations.
pub(crate) trait LookupKey<ID> {
    fn eq(&self, other: &ID) -> bool;
    fn to_id(self) -> ID;
}

struct Entry<ID, T> {
    epoch: u64,
    id: ID,
    data: T,
}

/// A least-recently-used cache with a linear scan over its entries, meant for
/// a few tens of entries at most.
pub(crate) struct LruCache<ID, T> {
    entries: Vec<Entry<ID, T>>,
    epoch: u64,
    max_entries: usize,
}

impl<ID, T> LruCache<ID, T> {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            epoch: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns the entry for `id`, creating it with `make_data` if missing.
    ///
    /// When the cache is full, the least recently used entry is replaced.
    pub(crate) fn entry(&mut self, id: impl LookupKey<ID>, make_data: impl FnOnce() -> T) -> &T {
        self.epoch += 1;
        let epoch = self.epoch;
        let index = match self.entries.iter().position(|entry| id.eq(&entry.id)) {
            Some(index) => index,
            None if self.entries.len() < self.max_entries => {
                self.entries.push(Entry {
                    epoch,
                    id: id.to_id(),
                    data: make_data(),
                });
                self.entries.len() - 1
            }
            None => {
                let oldest = self
                    .entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, entry)| entry.epoch)
                    .map_or(0, |(index, _)| index);
                self.entries[oldest] = Entry {
                    epoch,
                    id: id.to_id(),
                    data: make_data(),
                };
                oldest
            }
        };
        let entry = &mut self.entries[index];
        entry.epoch = epoch;
        &entry.data
    }
}

impl<ID, T> core::fmt::Debug for LruCache<ID, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}
