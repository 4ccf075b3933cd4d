//! Drawing a filled grid as a raster image: black background, white open cells, and each letter
//! centered in its cell.

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageError, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::info;
use std::path::{Path, PathBuf};

use crate::backtracking_search::Choice;
use crate::grid_config::GridConfig;
use crate::render::letter_grid;

/// Side length of one grid cell, in pixels.
pub const CELL_SIZE: u32 = 100;

/// Width of the black border left around each open cell.
pub const CELL_BORDER: u32 = 2;

const FONT_SIZE: f32 = 80.0;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

static FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

#[derive(Debug, thiserror::Error)]
pub enum ImageExportError {
    #[error("failed to load font: {0}")]
    Font(#[from] InvalidFont),

    #[error("failed to write image to '{}': {source}", .path.display())]
    Write { path: PathBuf, source: ImageError },
}

/// Does `path` name a file we should write as an image rather than as text?
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Draw the grid with the given fill choices applied. The image is `CELL_SIZE` pixels per cell in
/// each direction.
pub fn draw_grid(config: &GridConfig, choices: &[Choice]) -> Result<RgbaImage, ImageExportError> {
    let font = FontRef::try_from_slice(FONT_DATA)?;
    let scale = PxScale::from(FONT_SIZE);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;

    let mut img = RgbaImage::from_pixel(
        config.width() as u32 * CELL_SIZE,
        config.height() as u32 * CELL_SIZE,
        BLACK,
    );

    let letters = letter_grid(config, choices);

    for (row, open_cells) in config.structure.iter().enumerate() {
        for (col, &open) in open_cells.iter().enumerate() {
            if !open {
                continue;
            }

            let left = (col as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let top = (row as u32 * CELL_SIZE + CELL_BORDER) as i32;
            draw_filled_rect_mut(&mut img, Rect::at(left, top).of_size(interior_size, interior_size), WHITE);

            if let Some(letter) = letters[row][col] {
                let text = letter.to_string();
                let (text_width, text_height) = text_size(scale, &font, &text);
                let x = left + (interior_size as i32 - text_width as i32) / 2;
                let y = top + (interior_size as i32 - text_height as i32) / 2;
                draw_text_mut(&mut img, BLACK, x, y, scale, &font, &text);
            }
        }
    }

    Ok(img)
}

/// Draw the grid and write it to `path`. The format follows the file extension.
pub fn save_image<P: AsRef<Path>>(config: &GridConfig, choices: &[Choice], path: P) -> Result<(), ImageExportError> {
    let path = path.as_ref();
    let img = draw_grid(config, choices)?;

    img.save(path).map_err(|source| ImageExportError::Write { path: path.to_path_buf(), source })?;
    info!("Wrote {}x{} image to {}", img.width(), img.height(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_config::generate_grid_config_from_template_string;

    /// ___#
    /// _#_#
    /// ___#
    fn config() -> GridConfig {
        generate_grid_config_from_template_string(
            &["BOA", "BAD", "DOE", "AXE"].iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            "
            ___#
            _#_#
            ___#
            ",
        ).unwrap()
    }

    fn full_fill() -> Vec<Choice> {
        vec![
            Choice { slot_id: 0, word_id: 1 },
            Choice { slot_id: 1, word_id: 0 },
            Choice { slot_id: 2, word_id: 3 },
            Choice { slot_id: 3, word_id: 2 },
        ]
    }

    fn cell_interior(row: u32, col: u32) -> impl Iterator<Item = (u32, u32)> {
        let left = col * CELL_SIZE + CELL_BORDER;
        let top = row * CELL_SIZE + CELL_BORDER;
        let size = CELL_SIZE - 2 * CELL_BORDER;
        (top..top + size).flat_map(move |y| (left..left + size).map(move |x| (x, y)))
    }

    fn is_dark(pixel: &Rgba<u8>) -> bool {
        pixel.0[0] < 128
    }

    #[test]
    fn test_image_dimensions() {
        let img = draw_grid(&config(), &full_fill()).unwrap();

        assert_eq!(img.width(), 4 * CELL_SIZE);
        assert_eq!(img.height(), 3 * CELL_SIZE);
    }

    #[test]
    fn test_cell_colors() {
        let img = draw_grid(&config(), &full_fill()).unwrap();

        // Blocks are solid black.
        assert!(cell_interior(1, 1).all(|(x, y)| *img.get_pixel(x, y) == BLACK));
        assert!(cell_interior(0, 3).all(|(x, y)| *img.get_pixel(x, y) == BLACK));

        // Open cells have a black border, a white background and some dark letter pixels.
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert_eq!(*img.get_pixel(CELL_SIZE - 1, CELL_SIZE - 1), BLACK);
        assert_eq!(*img.get_pixel(CELL_BORDER + 2, CELL_BORDER + 2), WHITE);
        assert!(cell_interior(0, 0).any(|(x, y)| is_dark(img.get_pixel(x, y))));
        assert!(cell_interior(2, 2).any(|(x, y)| is_dark(img.get_pixel(x, y))));
    }

    #[test]
    fn test_unfilled_cells_stay_white() {
        let img = draw_grid(&config(), &[Choice { slot_id: 1, word_id: 0 }]).unwrap();

        assert!(cell_interior(2, 1).all(|(x, y)| *img.get_pixel(x, y) == WHITE));
        assert!(cell_interior(0, 1).any(|(x, y)| is_dark(img.get_pixel(x, y))));
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("grid.png")));
        assert!(is_image_path(Path::new("out/GRID.PNG")));
        assert!(!is_image_path(Path::new("grid.txt")));
        assert!(!is_image_path(Path::new("png")));
    }
}
