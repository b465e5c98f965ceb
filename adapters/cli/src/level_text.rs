//! Plain-text level encoding read by the command-line adapter.
//!
//! Each line is one row of the grid. `1` marks a wall, `.` open floor, `P`
//! the player spawn, `M` a mob spawn and `B` a boss spawn. Trailing whitespace
//! and blank lines at the end of the file are ignored.

use shooter_core::{LevelError, TileGrid, TileKind};
use thiserror::Error;

/// Errors raised while decoding a text level.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LevelTextError {
    /// A cell used a symbol outside the level alphabet.
    #[error("unknown tile symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
        /// Symbol that could not be decoded.
        symbol: char,
    },
    /// The decoded rows do not form a playable grid.
    #[error(transparent)]
    Layout(#[from] LevelError),
}

/// Decodes a text level into a validated tile grid.
pub(crate) fn decode(contents: &str) -> Result<TileGrid, LevelTextError> {
    let lines: Vec<&str> = contents.lines().map(str::trim_end).collect();
    let used = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);

    let mut rows = Vec::with_capacity(used);
    for (row, line) in lines.iter().take(used).enumerate() {
        let tiles = line
            .chars()
            .enumerate()
            .map(|(column, symbol)| {
                tile_for(symbol).ok_or(LevelTextError::UnknownSymbol {
                    row,
                    column,
                    symbol,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(tiles);
    }

    Ok(TileGrid::from_rows(rows)?)
}

fn tile_for(symbol: char) -> Option<TileKind> {
    match symbol {
        '1' => Some(TileKind::Wall),
        '.' => Some(TileKind::Empty),
        'P' => Some(TileKind::PlayerSpawn),
        'M' => Some(TileKind::MobSpawn),
        'B' => Some(TileKind::BossSpawn),
        _ => None,
    }
}
