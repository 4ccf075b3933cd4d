//! Backtracking search over the domains left behind by node and arc consistency.
//!
//! Slots are chosen by minimum remaining values, then by degree, then by slot id; words for a
//! slot are tried in least-constraining-value order. No inference happens once search starts:
//! the domains are exactly what AC-3 left, and each tentative assignment is only checked with
//! `consistent`.
//!
//! The search keeps an explicit stack of frames rather than recursing, one frame per slot it has
//! assigned, so the depth of a grid is limited by memory instead of by the call stack.

use instant::{Duration, Instant};
use log::{debug, info};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::arc_consistency::{establish_arc_consistency, revise, Arc, ArcConsistencyFailure, ArcConsistencyResult};
use crate::domains::DomainStore;
use crate::grid_config::{GridConfig, Slot, SlotId, WordId};
use crate::MAX_SLOT_COUNT;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words. Entries remember the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    word_ids_by_slot: Vec<Option<WordId>>,
    choices: SmallVec<[Choice; MAX_SLOT_COUNT]>,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            word_ids_by_slot: vec![None; slot_count],
            choices: SmallVec::new(),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids_by_slot.get(slot_id).copied().flatten()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// Assign `word_id` to `slot_id`, returning the word it replaced, if any.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        if slot_id >= self.word_ids_by_slot.len() {
            self.word_ids_by_slot.resize(slot_id + 1, None);
        }

        let previous = self.word_ids_by_slot[slot_id].replace(word_id);
        match self.choices.iter_mut().find(|choice| choice.slot_id == slot_id) {
            Some(choice) => choice.word_id = word_id,
            None => self.choices.push(Choice { slot_id, word_id }),
        }
        previous
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.word_ids_by_slot.get_mut(slot_id)?.take()?;
        if let Some(idx) = self.choices.iter().rposition(|choice| choice.slot_id == slot_id) {
            self.choices.remove(idx);
        }
        Some(previous)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// The current entries, oldest first.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// How many tentative assignments were checked for consistency.
    pub states: u64,

    /// How many slots ran out of candidates, sending the search back to the previous slot.
    pub backtracks: u64,

    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    /// The fill as a map from each slot to the word chosen for it.
    pub fn words_by_slot(&self, config: &GridConfig) -> BTreeMap<Slot, String> {
        self.choices.iter()
            .map(|choice| (config.slot(choice.slot_id), config.word(choice.word_id).string.clone()))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FillFailure {
    /// Arc consistency emptied this slot's domain before search started.
    #[error("no fill exists: no word fits slot {slot_id}")]
    Infeasible { slot_id: SlotId, statistics: Statistics },

    /// Search tried every candidate without completing the grid.
    #[error("no fill exists: every candidate was tried")]
    Exhausted { statistics: Statistics },
}

impl FillFailure {
    pub fn statistics(&self) -> &Statistics {
        match self {
            FillFailure::Infeasible { statistics, .. } | FillFailure::Exhausted { statistics } => statistics,
        }
    }
}

/// One level of the search: the slot being filled, its candidates in the order they'll be tried,
/// and how many have been tried so far.
#[derive(Debug)]
struct Frame {
    slot_id: SlotId,
    candidates: Vec<WordId>,
    next_candidate: usize,
}

/// The solver for a single grid. It owns the domains for the grid's slots; the grid itself is
/// only borrowed.
#[derive(Debug)]
pub struct Filler<'a> {
    config: &'a GridConfig,
    domains: DomainStore,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    /// Create a filler where every slot starts out with the whole vocabulary.
    pub fn new(config: &'a GridConfig) -> Filler<'a> {
        Filler {
            config,
            domains: DomainStore::initialize(config),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &DomainStore {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn enforce_node_consistency(&mut self) {
        self.domains.enforce_node_consistency(self.config);
    }

    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        revise(self.config, &mut self.domains, x, y)
    }

    pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> ArcConsistencyResult {
        establish_arc_consistency(self.config, &mut self.domains, arcs)
    }

    /// Does `assignment` have a word for every slot in the grid?
    pub fn assignment_complete(&self, assignment: &Assignment) -> bool {
        (0..self.config.slot_count()).all(|slot_id| assignment.contains(slot_id))
    }

    /// Check the entries of `assignment` against each other: every word has its slot's length, no
    /// word is used twice, and crossing slots agree on their shared cell. Unassigned slots and the
    /// domains aren't looked at.
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        let config = self.config;

        for choice in assignment.choices() {
            let word = config.word(choice.word_id);

            if word.len() != config.slot(choice.slot_id).length {
                return false;
            }

            let dupe = assignment.choices().iter().any(|other| {
                other.slot_id != choice.slot_id && config.word(other.word_id).string == word.string
            });
            if dupe {
                return false;
            }

            for &neighbor_id in config.neighbors(choice.slot_id) {
                let neighbor_word_id = match assignment.get(neighbor_id) {
                    Some(word_id) => word_id,
                    None => continue,
                };
                if let Some((cell, neighbor_cell)) = config.overlap(choice.slot_id, neighbor_id) {
                    if word.glyphs.get(cell) != config.word(neighbor_word_id).glyphs.get(neighbor_cell) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Pick the next slot to fill: fewest remaining options, then most crossings, then lowest slot
    /// id. Returns `None` once every slot is assigned.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !assignment.contains(slot_id))
            .min_by_key(|&slot_id| {
                (self.domains.len(slot_id), Reverse(self.config.neighbors(slot_id).len()))
            })
    }

    /// How many options for `var`'s unassigned neighbors would be incompatible with putting
    /// `word_id` in `var`?
    pub fn count_ruled_out(&self, var: SlotId, word_id: WordId, assignment: &Assignment) -> usize {
        let word = self.config.word(word_id);

        self.config.neighbors(var).iter()
            .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
            .filter_map(|&neighbor_id| {
                self.config.overlap(var, neighbor_id).map(|overlap| (neighbor_id, overlap))
            })
            .map(|(neighbor_id, (cell, neighbor_cell))| {
                let glyph = word.glyphs.get(cell);
                self.domains.iter(neighbor_id)
                    .filter(|&neighbor_word_id| {
                        self.config.word(neighbor_word_id).glyphs.get(neighbor_cell) != glyph
                    })
                    .count()
            })
            .sum()
    }

    /// The options for `var`, least constraining first. Options that rule out the same number of
    /// neighbor options stay in domain order.
    pub fn order_domain_values(&self, var: SlotId, assignment: &Assignment) -> Vec<WordId> {
        let mut values: Vec<WordId> = self.domains.iter(var).collect();
        if values.len() == 1 {
            return values;
        }

        values.sort_by_cached_key(|&word_id| self.count_ruled_out(var, word_id, assignment));
        values
    }

    /// Extend `assignment` to a complete, consistent one. On success `assignment` holds the fill;
    /// on failure it's left exactly as it was passed in.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        let mut frames: Vec<Frame> = Vec::with_capacity(self.config.slot_count());

        'descend: loop {
            if self.assignment_complete(assignment) {
                return true;
            }

            let slot_id = match self.select_unassigned_variable(assignment) {
                Some(slot_id) => slot_id,
                None => return true,
            };

            let candidates = self.order_domain_values(slot_id, assignment);
            frames.push(Frame { slot_id, candidates, next_candidate: 0 });

            while let Some(frame) = frames.last_mut() {
                while let Some(&word_id) = frame.candidates.get(frame.next_candidate) {
                    frame.next_candidate += 1;
                    self.statistics.states += 1;

                    assignment.insert(frame.slot_id, word_id);
                    if self.consistent(assignment) {
                        continue 'descend;
                    }
                    assignment.remove(frame.slot_id);
                }

                // Out of candidates: drop this slot and move the previous one on to its next word.
                frames.pop();
                self.statistics.backtracks += 1;
                if let Some(parent) = frames.last() {
                    assignment.remove(parent.slot_id);
                }
            }

            return false;
        }
    }

    /// Prune the domains, then search. Consumes the filler since its domains are spent afterwards.
    pub fn solve(mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.enforce_node_consistency();

        if let Err(ArcConsistencyFailure { slot_id }) = self.ac3(None) {
            self.statistics.duration = start.elapsed();
            info!("Arc consistency left slot {:?} with no options", self.config.slot(slot_id));
            return Err(FillFailure::Infeasible { slot_id, statistics: self.statistics });
        }

        debug!(
            "Searching with {} remaining candidates",
            (0..self.config.slot_count()).map(|slot_id| self.domains.len(slot_id)).sum::<usize>(),
        );

        let mut assignment = Assignment::new(self.config.slot_count());
        let found = self.backtrack(&mut assignment);

        self.statistics.duration = start.elapsed();
        info!("Search finished: found={} {:?}", found, self.statistics);

        if found {
            Ok(FillSuccess {
                statistics: self.statistics,
                choices: assignment.choices().to_vec(),
            })
        } else {
            Err(FillFailure::Exhausted { statistics: self.statistics })
        }
    }
}

/// Search for a valid fill for the given grid.
pub fn find_fill(config: &GridConfig) -> Result<FillSuccess, FillFailure> {
    Filler::new(config).solve()
}
