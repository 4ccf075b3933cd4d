use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use gridfill::grid_config::read_template_file;
use gridfill::word_list::load_word_list;
use gridfill::image_export::{is_image_path, save_image};
use gridfill::{find_fill, generate_grid_config_from_template_string, render_grid, FillFailure};

/// Fill a crossword grid from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Structure file: `_` for open cells, anything else for blocks
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file: a PNG image if the name ends in `.png`, text
    /// otherwise
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let debug_enabled = std::env::var("GRIDFILL_DEBUG").is_ok();
    gridfill::log::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let template = read_template_file(&cli.structure)?;
    let word_list = load_word_list(&cli.words)?;
    let grid_config = generate_grid_config_from_template_string(&word_list, &template)?;

    match find_fill(&grid_config) {
        Ok(result) => {
            eprintln!("{:?}", result.statistics);

            let display_grid = render_grid(&grid_config, &result.choices);
            println!("{}", display_grid);

            match &cli.output {
                Some(output) if is_image_path(output) => {
                    save_image(&grid_config, &result.choices, output)?;
                }
                Some(output) => {
                    fs::write(output, format!("{}\n", display_grid)).map_err(|e| {
                        format!("failed to write grid to '{}': {}", output.display(), e)
                    })?;
                    log::info!("Wrote grid to {}", output.display());
                }
                None => {}
            }
        }
        Err(failure) => {
            eprintln!("{:?}", failure.statistics());
            if let FillFailure::Infeasible { slot_id, .. } = &failure {
                log::info!("{} ({:?})", failure, grid_config.slot(*slot_id));
            }
            println!("No solution.");
        }
    }

    Ok(())
}
