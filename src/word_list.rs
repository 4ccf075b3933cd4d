//! Loading the vocabulary that every slot's domain starts from.
//!
//! The format is one word per line. Words are uppercased, blank lines are skipped, and duplicates
//! are dropped, keeping the position of the first occurrence so that word ids (and therefore the
//! order candidates are tried in) follow the file.

use std::collections::HashSet;
use std::path::Path;

/// Parse a word list from an in-memory string.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();

    contents
        .lines()
        .map(|line| line.trim().to_uppercase())
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Read a word list from disk and parse it.
///
/// # Errors
///
/// Will return an `Error` if unable to read a file at `path`.
pub fn load_word_list<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    let path_ref = path.as_ref();

    let data = std::fs::read_to_string(path_ref).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read word list from '{}': {}", path_ref.display(), e),
        )
    })?;

    Ok(parse_word_list(&data))
}
