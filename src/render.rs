use crate::backtracking_search::Choice;
use crate::grid_config::GridConfig;

/// Character used for blocked cells.
pub const BLOCK: char = '█';

/// The letter in each cell of the grid after applying `choices`, or `None` for blocks and for open
/// cells no choice covers. Indexed as `[row][col]`.
pub fn letter_grid(config: &GridConfig, choices: &[Choice]) -> Vec<Vec<Option<char>>> {
    let mut grid: Vec<Vec<Option<char>>> = config.structure.iter()
        .map(|row| vec![None; row.len()])
        .collect();

    for &Choice { slot_id, word_id } in choices {
        let word = config.word(word_id);

        for ((row, col), &glyph) in config.slot(slot_id).cell_coords().zip(&word.glyphs) {
            if let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = Some(config.glyphs[glyph]);
            }
        }
    }

    grid
}

/// Turn the given grid config and fill choices into a rendered string. Open cells that no choice
/// covers are left blank.
pub fn render_grid(config: &GridConfig, choices: &[Choice]) -> String {
    letter_grid(config, choices).iter().zip(&config.structure).map(|(letters, open_cells)| {
        letters.iter().zip(open_cells).map(|(letter, &open)| {
            if open { letter.unwrap_or(' ') } else { BLOCK }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}
