use bit_set::BitSet;
use log::debug;

use crate::grid_config::{GridConfig, SlotId, WordId};

/// The words still considered possible for each slot, stored as a set of word ids per slot.
/// Iterating a domain yields word ids in ascending order, which is vocabulary order.
///
/// Domains only ever shrink: there is no way to put a word back once it's been removed.
#[derive(Debug, Clone)]
pub struct DomainStore {
    domains: Vec<BitSet>,
}

impl DomainStore {
    /// Create a store where every slot can hold every word in the vocabulary.
    pub fn initialize(config: &GridConfig) -> DomainStore {
        let word_count = config.word_count();

        let full: BitSet = {
            let mut set = BitSet::with_capacity(word_count);
            for word_id in 0..word_count {
                set.insert(word_id);
            }
            set
        };

        DomainStore {
            domains: (0..config.slot_count()).map(|_| full.clone()).collect(),
        }
    }

    /// Remove every word whose length doesn't match its slot's length.
    pub fn enforce_node_consistency(&mut self, config: &GridConfig) {
        for (slot_id, domain) in self.domains.iter_mut().enumerate() {
            let length = config.slot(slot_id).length;
            let mismatched: Vec<WordId> =
                domain.iter().filter(|&word_id| config.word(word_id).len() != length).collect();

            for word_id in mismatched {
                domain.remove(word_id);
            }
        }

        debug!(
            "Node consistency left {} candidates across {} slots",
            self.domains.iter().map(|domain| domain.len()).sum::<usize>(),
            self.domains.len(),
        );
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    pub fn iter(&self, slot_id: SlotId) -> DomainIter<'_> {
        let domain = &self.domains[slot_id];
        DomainIter { inner: domain.iter(), remaining: domain.len() }
    }

    /// Remove a word from a slot's domain, returning whether it was there.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }
}

/// The word ids in one slot's domain, in ascending order.
///
/// `bit_set::Iter` bounds its size by the blocks it has left to scan rather than the bits still
/// set, which undercounts, so the exact count is tracked here instead.
#[derive(Clone)]
pub struct DomainIter<'a> {
    inner: bit_set::Iter<'a, u32>,
    remaining: usize,
}

impl Iterator for DomainIter<'_> {
    type Item = WordId;

    fn next(&mut self) -> Option<WordId> {
        let word_id = self.inner.next()?;
        self.remaining -= 1;
        Some(word_id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DomainIter<'_> {}
