//! Crossword filling as a constraint-satisfaction problem: pick a word for every slot of a grid so
//! that lengths match, crossing letters agree, and no word is used twice.
//!
//! The pipeline is node consistency, then AC-3, then backtracking search with MRV/degree slot
//! ordering and least-constraining-value word ordering.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod image_export;
pub mod log;
pub mod render;
pub mod word_list;

pub use backtracking_search::{find_fill, Assignment, Choice, FillFailure, FillSuccess, Filler, Statistics};
pub use grid_config::{
    generate_grid_config, generate_grid_config_from_template_string, Direction, GridConfig, GridError, Slot,
};
pub use render::render_grid;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
