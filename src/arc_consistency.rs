//! AC-3 over the crossings of a grid. A grid is arc-consistent when every option for every slot
//! has at least one option in each crossing slot that puts the same letter in the shared cell.
//!
//! This runs once, before search, and its eliminations are permanent.

use bit_set::BitSet;
use log::debug;
use std::collections::{HashSet, VecDeque};

use crate::domains::DomainStore;
use crate::grid_config::{GridConfig, SlotId, WordId};

/// A directed arc: every option for `x` needs a supporting option in `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arc {
    pub x: SlotId,
    pub y: SlotId,
}

impl Arc {
    pub fn new(x: SlotId, y: SlotId) -> Arc {
        Arc { x, y }
    }
}

/// Returned when propagation empties a slot's domain, meaning the grid can't be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<(), ArcConsistencyFailure>;

/// FIFO worklist of arcs. An arc that's already waiting isn't queued a second time.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_arcs<Items>(items: Items) -> ArcQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Every directed arc in the grid, in slot order and then neighbor order. Each crossing shows up
/// twice, once in each direction.
pub fn all_arcs(config: &GridConfig) -> Vec<Arc> {
    (0..config.slot_count())
        .flat_map(|x| config.neighbors(x).iter().map(move |&y| Arc::new(x, y)))
        .collect()
}

/// Make `x` arc-consistent with `y`, removing any option for `x` whose letter in the shared cell
/// doesn't appear in that cell for any of `y`'s options. Returns whether anything was removed;
/// slots that don't cross are left alone.
pub fn revise(config: &GridConfig, domains: &mut DomainStore, x: SlotId, y: SlotId) -> bool {
    let (x_cell, y_cell) = match config.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    // Which glyphs can `y` still put in the shared cell?
    let mut supported_glyphs = BitSet::with_capacity(config.glyphs.len());
    for word_id in domains.iter(y) {
        if let Some(&glyph) = config.word(word_id).glyphs.get(y_cell) {
            supported_glyphs.insert(glyph);
        }
    }

    let unsupported: Vec<WordId> = domains.iter(x).filter(|&word_id| {
        !config.word(word_id).glyphs.get(x_cell)
            .map(|&glyph| supported_glyphs.contains(glyph))
            .unwrap_or(false)
    }).collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// Run AC-3 until no more eliminations are possible. If `arcs` is `None`, start from every arc in
/// the grid; otherwise start from just the given ones. Fails as soon as any domain is emptied.
pub fn establish_arc_consistency(
    config: &GridConfig,
    domains: &mut DomainStore,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::with_initial_arcs(arcs.unwrap_or_else(|| all_arcs(config)));
    let mut revisions: u64 = 0;

    while let Some(Arc { x, y }) = queue.pop_front() {
        if !revise(config, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            debug!("Arc consistency emptied slot {} after {} revisions", x, revisions);
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        // `x` lost options, so every other slot crossing it needs to be rechecked against it.
        for &z in config.neighbors(x) {
            if z != y {
                queue.enqueue(Arc::new(z, x));
            }
        }
    }

    debug!("Arc consistency reached after {} revisions", revisions);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_config::{generate_grid_config, generate_grid_config_from_template_string, Slot};
    use crate::grid_config::Direction::{Across, Down};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn pruned_domains(config: &GridConfig) -> DomainStore {
        let mut domains = DomainStore::initialize(config);
        domains.enforce_node_consistency(config);
        domains
    }

    fn domain_words(config: &GridConfig, domains: &DomainStore, slot_id: SlotId) -> Vec<String> {
        domains.iter(slot_id).map(|word_id| config.word(word_id).string.clone()).collect()
    }

    /// A 3-letter across and a 3-letter down sharing their first cell.
    fn corner_config(vocabulary: &[&str]) -> GridConfig {
        generate_grid_config(&words(vocabulary), &[
            Slot::new(Across, 0, 0, 3),
            Slot::new(Down, 0, 0, 3),
        ]).unwrap()
    }

    /// ABX
    /// ##Q
    /// ##Q
    /// PPZPP
    fn chain_config() -> GridConfig {
        generate_grid_config(&words(&["ABX", "ABY", "XQQZ", "YQQW", "PPZPP"]), &[
            Slot::new(Across, 0, 0, 3),
            Slot::new(Down, 0, 2, 4),
            Slot::new(Across, 3, 0, 5),
        ]).unwrap()
    }

    #[test]
    fn test_all_arcs_cover_both_directions() {
        let config = chain_config();

        assert_eq!(all_arcs(&config), vec![
            Arc::new(0, 1),
            Arc::new(1, 0),
            Arc::new(1, 2),
            Arc::new(2, 1),
        ]);
    }

    #[test]
    fn test_shared_first_letter_keeps_both_words() {
        let config = corner_config(&["CAT", "COW"]);
        let mut domains = pruned_domains(&config);

        assert_eq!(establish_arc_consistency(&config, &mut domains, None), Ok(()));
        assert_eq!(domain_words(&config, &domains, 0), vec!["CAT", "COW"]);
        assert_eq!(domain_words(&config, &domains, 1), vec!["CAT", "COW"]);
    }

    #[test]
    fn test_letter_support_ignores_word_identity() {
        // Each word supports itself across the shared cell, so AC-3 alone can't rule anything out
        // here; it's the search that discovers there's no fill.
        let config = corner_config(&["CAT", "DOG"]);
        let mut domains = pruned_domains(&config);

        assert_eq!(establish_arc_consistency(&config, &mut domains, None), Ok(()));
        assert_eq!(domains.len(0), 2);
        assert_eq!(domains.len(1), 2);
    }

    #[test]
    fn test_wipeout_fails() {
        let config = generate_grid_config(&words(&["CAT", "DOGS"]), &[
            Slot::new(Across, 0, 0, 3),
            Slot::new(Down, 0, 0, 4),
        ]).unwrap();
        let mut domains = pruned_domains(&config);

        assert_eq!(
            establish_arc_consistency(&config, &mut domains, None),
            Err(ArcConsistencyFailure { slot_id: 0 }),
        );
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let config = chain_config();
        let mut domains = pruned_domains(&config);

        assert!(revise(&config, &mut domains, 1, 2));
        assert_eq!(domain_words(&config, &domains, 1), vec!["XQQZ"]);
        assert!(!revise(&config, &mut domains, 1, 2));
    }

    #[test]
    fn test_revise_ignores_slots_that_dont_cross() {
        let config = chain_config();
        let mut domains = pruned_domains(&config);

        assert!(!revise(&config, &mut domains, 0, 2));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_eliminations_propagate_along_crossings() {
        let config = chain_config();
        let mut domains = pruned_domains(&config);

        assert_eq!(establish_arc_consistency(&config, &mut domains, None), Ok(()));
        assert_eq!(domain_words(&config, &domains, 0), vec!["ABX"]);
        assert_eq!(domain_words(&config, &domains, 1), vec!["XQQZ"]);
        assert_eq!(domain_words(&config, &domains, 2), vec!["PPZPP"]);
    }

    #[test]
    fn test_explicit_arcs_limit_the_starting_queue() {
        let config = chain_config();
        let mut domains = pruned_domains(&config);

        assert_eq!(establish_arc_consistency(&config, &mut domains, Some(vec![Arc::new(0, 1)])), Ok(()));
        assert_eq!(domains.len(0), 2);
        assert_eq!(domains.len(1), 2);

        // Revising 1 against 2 shrinks 1, which puts (0, 1) back on the queue.
        assert_eq!(establish_arc_consistency(&config, &mut domains, Some(vec![Arc::new(1, 2)])), Ok(()));
        assert_eq!(domain_words(&config, &domains, 0), vec!["ABX"]);
    }

    #[test]
    fn test_queue_skips_arcs_already_waiting() {
        let mut queue = ArcQueue::with_initial_arcs(vec![Arc::new(0, 1), Arc::new(1, 0), Arc::new(0, 1)]);
        queue.enqueue(Arc::new(1, 0));

        assert_eq!(queue.pop_front(), Some(Arc::new(0, 1)));
        queue.enqueue(Arc::new(0, 1));
        assert_eq!(queue.pop_front(), Some(Arc::new(1, 0)));
        assert_eq!(queue.pop_front(), Some(Arc::new(0, 1)));
        assert_eq!(queue.pop_front(), None);
    }

    /// AC-3 with a worklist that holds every re-enqueued arc, duplicates included.
    fn establish_with_duplicate_arcs(config: &GridConfig, domains: &mut DomainStore) -> ArcConsistencyResult {
        let mut queue: VecDeque<Arc> = all_arcs(config).into_iter().collect();

        while let Some(Arc { x, y }) = queue.pop_front() {
            if revise(config, domains, x, y) {
                if domains.is_empty(x) {
                    return Err(ArcConsistencyFailure { slot_id: x });
                }
                for &z in config.neighbors(x) {
                    if z != y {
                        queue.push_back(Arc::new(z, x));
                    }
                }
            }
        }

        Ok(())
    }

    #[test]
    fn test_skipping_waiting_arcs_reaches_the_same_result() {
        let vocabularies: &[&[&str]] = &[
            &["BOA", "BAD", "DOE", "AXE", "CAT", "DOG", "ZZZ"],
            &["BOA", "BAD", "DOE", "AXE", "BOB", "ABA"],
            &["CAT", "DOG"],
            &["ABC"],
            &["AAA", "ABA", "BAB", "BBB"],
        ];

        for vocabulary in vocabularies {
            // ___
            // _#_
            // ___
            let config = generate_grid_config_from_template_string(&words(vocabulary), "___\n_#_\n___").unwrap();

            let mut deduped = pruned_domains(&config);
            let mut duplicated = pruned_domains(&config);
            let deduped_result = establish_arc_consistency(&config, &mut deduped, None);
            let duplicated_result = establish_with_duplicate_arcs(&config, &mut duplicated);

            assert_eq!(deduped_result.is_ok(), duplicated_result.is_ok(), "verdict for {:?}", vocabulary);
            if deduped_result.is_ok() {
                for slot_id in 0..config.slot_count() {
                    assert_eq!(
                        domain_words(&config, &deduped, slot_id),
                        domain_words(&config, &duplicated, slot_id),
                        "slot {} for {:?}", slot_id, vocabulary,
                    );
                }
            }
        }

        // `ABC` alone wipes out: its last letter never starts a word.
        let config = generate_grid_config_from_template_string(&words(&["ABC"]), "___\n_#_\n___").unwrap();
        assert!(establish_arc_consistency(&config, &mut pruned_domains(&config), None).is_err());
    }
}
