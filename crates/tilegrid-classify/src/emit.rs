//! Plain-text matrix format shared with the downstream solver.
//!
//! One grid row per line, codes separated by single spaces, trailing
//! newline. A file may hold several matrices separated by blank lines.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::classifier::ClassificationMatrix;

/// Render the matrix as text.
pub fn format_matrix(matrix: &ClassificationMatrix) -> String {
    let mut out = String::with_capacity(matrix.labels.len() * 3);
    for row in matrix.rows() {
        let line: Vec<String> = row.iter().map(|l| l.code().to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn write_matrix<W: Write>(mut writer: W, matrix: &ClassificationMatrix) -> io::Result<()> {
    writer.write_all(format_matrix(matrix).as_bytes())?;
    writer.flush()
}

/// Write the matrix to `path`.
///
/// With `append` the matrix is added after a blank line to whatever the
/// file already holds, so levels can be collected into one file and read
/// back with [`parse_matrices`].
pub fn write_matrix_file(
    path: impl AsRef<Path>,
    matrix: &ClassificationMatrix,
    append: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let needs_separator = append && path.metadata().map(|m| m.len() > 0).unwrap_or(false);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    if needs_separator {
        file.write_all(b"\n")?;
    }
    write_matrix(file, matrix)
}

/// Read every matrix in `text`.
///
/// Blank lines end the current matrix. Lines without any digit (titles,
/// comments) and lines with a non-integer token are skipped.
pub fn parse_matrices(text: &str) -> Vec<Vec<Vec<i64>>> {
    let mut matrices = Vec::new();
    let mut current: Vec<Vec<i64>> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                matrices.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !line.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        match line
            .split_whitespace()
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(row) => current.push(row),
            Err(_) => log::debug!("skipping malformed matrix line {line:?}"),
        }
    }
    if !current.is_empty() {
        matrices.push(current);
    }
    matrices
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegrid_core::GridSpec;
    use tilegrid_templates::{CellLabel, TileType};

    fn sample() -> ClassificationMatrix {
        ClassificationMatrix {
            grid: GridSpec { rows: 2, cols: 3 },
            labels: vec![
                TileType::Wall.into(),
                TileType::Wall.into(),
                TileType::Wall.into(),
                TileType::Floor.into(),
                CellLabel::Unmapped(40),
                CellLabel::Unresolved,
            ],
        }
    }

    #[test]
    fn formats_space_separated_rows() {
        assert_eq!(format_matrix(&sample()), "1 1 1\n0 40 -1\n");
    }

    #[test]
    fn parses_multiple_levels() {
        let text = "Level 1\n1 1 1\n0 2 0\n\n\nLevel 2\n1 1\n4 x\n8 0\n";
        let parsed = parse_matrices(text);
        assert_eq!(
            parsed,
            vec![
                vec![vec![1, 1, 1], vec![0, 2, 0]],
                vec![vec![1, 1], vec![8, 0]],
            ]
        );
    }

    #[test]
    fn append_separates_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.txt");
        write_matrix_file(&path, &sample(), true).unwrap();
        write_matrix_file(&path, &sample(), true).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1 1 1\n0 40 -1\n\n1 1 1\n0 40 -1\n");
        assert_eq!(parse_matrices(&text).len(), 2);

        write_matrix_file(&path, &sample(), false).unwrap();
        assert_eq!(parse_matrices(&std::fs::read_to_string(&path).unwrap()).len(), 1);
    }
}
