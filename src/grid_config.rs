//! The static description of a puzzle: which slots exist, where they cross, and which words are
//! available to fill them. Nothing in here changes once a `GridConfig` has been built.

use log::info;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::path::Path;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given letter or whatever, based on its index in the Grid's `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given slot, based on its index in the Grid's `slots` field. Slot ids
/// follow the enumeration order the grid was built with.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the Grid's `words` field.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A crossword answer position. Two slots are the same slot iff all four fields match, so this
/// can be used directly as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
    pub length: usize,
}

impl Slot {
    pub fn new(direction: Direction, row: usize, col: usize, length: usize) -> Slot {
        Slot { direction, row, col, length }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> {
        let Slot { direction, row, col, length } = *self;

        (0..length).map(move |cell_idx| match direction {
            Direction::Across => (row, col + cell_idx),
            Direction::Down => (row + cell_idx, col),
        })
    }
}

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in characters, which is what gets compared against slot lengths.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Ways a puzzle definition can be unusable before any solving starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("word list must contain at least one word")]
    EmptyVocabulary,

    #[error("structure template has no rows")]
    EmptyStructure,

    #[error("entry {index} has length 0")]
    ZeroLengthEntry { index: usize },

    #[error("entries {first} and {second} run in the same direction through cell {cell:?}")]
    ParallelOverlap {
        first: usize,
        second: usize,
        cell: GridCoord,
    },

    #[error("more than two entries cross in cell {cell:?}")]
    TooManyEntriesInCell { cell: GridCoord },
}

/// A struct representing the aspects of a grid that are static during filling.
pub struct GridConfig {
    pub glyphs: Vec<char>,
    pub words: Vec<Word>,
    pub slots: Vec<Slot>,

    /// `structure[row][col]` is true for open cells and false for blocks.
    pub structure: Vec<Vec<bool>>,

    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,

    /// Keyed by both `(x, y)` and `(y, x)` for every crossing; the only record of where slots meet.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,
    slot_ids_by_slot: HashMap<Slot, SlotId>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("glyphs", &self.glyphs)
            .field("slots", &self.slots)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot_id: SlotId) -> Slot {
        self.slots[slot_id]
    }

    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids_by_slot.get(slot).copied()
    }

    /// The slots crossing `slot_id`, in the order their crossing cells appear along it.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// If `x` and `y` cross, return `(i, j)` such that cell `i` of `x` is cell `j` of `y`. This is
    /// symmetric: `overlap(y, x)` is `(j, i)`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn height(&self) -> usize {
        self.structure.len()
    }

    pub fn width(&self) -> usize {
        self.structure.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn is_open(&self, (row, col): GridCoord) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }
}

/// Turn a list of strings into the glyph table and `Word` structs. Glyph ids are handed out in
/// order of first appearance so that the result doesn't depend on hashing.
fn build_words(word_list: &[String]) -> (Vec<char>, Vec<Word>) {
    let mut glyph_table: Vec<char> = vec![];
    let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();

    let words: Vec<Word> = word_list.iter().map(|string| {
        let glyphs = string.chars().map(|char| {
            *glyph_ids_by_char.entry(char).or_insert_with(|| {
                glyph_table.push(char);
                glyph_table.len() - 1
            })
        }).collect();

        Word { string: string.clone(), glyphs }
    }).collect();

    (glyph_table, words)
}

/// Shared tail of both constructors: compute neighbors and the overlap table.
fn build_grid_config(
    word_list: &[String],
    entries: &[Slot],
    structure: Vec<Vec<bool>>,
) -> Result<GridConfig, GridError> {
    if word_list.is_empty() {
        return Err(GridError::EmptyVocabulary);
    }

    let (glyphs, words) = build_words(word_list);

    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings.
    let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().enumerate() {
            let cell_entries = entries_by_cell.entry(loc).or_default();

            if cell_entries.len() >= 2 {
                return Err(GridError::TooManyEntriesInCell { cell: loc });
            }
            if let Some(&(other_idx, _)) = cell_entries.iter()
                .find(|&&(other_idx, _)| entries[other_idx].direction == entry.direction)
            {
                return Err(GridError::ParallelOverlap {
                    first: other_idx,
                    second: entry_idx,
                    cell: loc,
                });
            }

            cell_entries.push((entry_idx, cell_idx));
        }
    }

    let mut neighbors = Vec::with_capacity(entries.len());
    let mut overlaps = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        let mut slot_neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = SmallVec::new();

        for (cell_idx, loc) in entry.cell_coords().enumerate() {
            let crossing = entries_by_cell[&loc].iter().find(|&&(other_idx, _)| other_idx != entry_idx);
            if let Some(&(other_idx, other_cell_idx)) = crossing {
                overlaps.insert((entry_idx, other_idx), (cell_idx, other_cell_idx));
                if !slot_neighbors.contains(&other_idx) {
                    slot_neighbors.push(other_idx);
                }
            }
        }

        neighbors.push(slot_neighbors);
    }

    let slot_ids_by_slot = entries.iter().enumerate().map(|(id, &slot)| (slot, id)).collect();

    info!(
        "Loaded {}x{} grid with {} slots, {} crossings and {} words",
        structure.len(),
        structure.first().map(|row| row.len()).unwrap_or(0),
        entries.len(),
        overlaps.len() / 2,
        words.len(),
    );

    Ok(GridConfig {
        glyphs,
        words,
        slots: entries.to_vec(),
        structure,
        neighbors,
        overlaps,
        slot_ids_by_slot,
    })
}

/// Generate a GridConfig representing a grid with specified entries. Slot ids follow the order of
/// `entries`, and every cell covered by an entry is considered open.
pub fn generate_grid_config(word_list: &[String], entries: &[Slot]) -> Result<GridConfig, GridError> {
    if let Some(index) = entries.iter().position(|entry| entry.length == 0) {
        return Err(GridError::ZeroLengthEntry { index });
    }

    let height = entries.iter().flat_map(|entry| entry.cell_coords()).map(|(row, _)| row + 1).max().unwrap_or(0);
    let width = entries.iter().flat_map(|entry| entry.cell_coords()).map(|(_, col)| col + 1).max().unwrap_or(0);

    let mut structure = vec![vec![false; width]; height];
    for (row, col) in entries.iter().flat_map(|entry| entry.cell_coords()) {
        structure[row][col] = true;
    }

    build_grid_config(word_list, entries, structure)
}

/// Generate a grid config from a string template, with `_` representing open cells and anything
/// else representing blocks. Whitespace around each line and blank lines are ignored, and short
/// lines are padded out with blocks.
///
/// Slots are listed in row-major order of their first cell; where a down and an across slot start
/// in the same cell, the down slot comes first.
pub fn generate_grid_config_from_template_string(
    word_list: &[String],
    template: &str,
) -> Result<GridConfig, GridError> {
    let lines: Vec<&str> = template.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    if lines.is_empty() {
        return Err(GridError::EmptyStructure);
    }

    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let structure: Vec<Vec<bool>> = lines.iter().map(|line| {
        let mut row: Vec<bool> = line.chars().map(|c| c == '_').collect();
        row.resize(width, false);
        row
    }).collect();

    let height = structure.len();
    let open = |row: usize, col: usize| row < height && col < width && structure[row][col];

    let mut entries: Vec<Slot> = vec![];

    for row in 0..height {
        for col in 0..width {
            if !open(row, col) {
                continue;
            }

            if row == 0 || !open(row - 1, col) {
                let length = (row..height).take_while(|&r| open(r, col)).count();
                if length > 1 {
                    entries.push(Slot::new(Direction::Down, row, col, length));
                }
            }

            if col == 0 || !open(row, col - 1) {
                let length = (col..width).take_while(|&c| open(row, c)).count();
                if length > 1 {
                    entries.push(Slot::new(Direction::Across, row, col, length));
                }
            }
        }
    }

    build_grid_config(word_list, &entries, structure)
}

/// Read a structure template from disk, putting the path into any error message.
pub fn read_template_file<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let path_ref = path.as_ref();

    std::fs::read_to_string(path_ref).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read structure from '{}': {}", path_ref.display(), e),
        )
    })
}
