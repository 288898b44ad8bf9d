//! Startup ingestion of the player pool from a headerless `position,player,team` CSV.

use std::{fs::File, io::ErrorKind, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{info, warn};

use crate::state::pool::{PlayerRecord, Position};

/// Failure to load the player file.
#[derive(Debug, Error)]
pub enum PlayerSourceError {
    /// The file exists but could not be read.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// File that failed to open.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Reading stopped partway through the file.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// File being parsed.
        path: String,
        /// Underlying reader error.
        source: csv::Error,
    },
}

/// Load the pool from `path`. A missing file yields an empty pool so the draft can still
/// start and receive an upload later.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, PlayerSourceError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "player file not found; starting with an empty pool");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(PlayerSourceError::Io {
                path: path.display().to_string(),
                source: err,
            });
        }
    };

    let players = parse_player_rows(file).map_err(|err| PlayerSourceError::Csv {
        path: path.display().to_string(),
        source: err,
    })?;
    info!(path = %path.display(), count = players.len(), "player pool loaded");
    Ok(players)
}

/// Parse rows in file order. Rows with an unknown position, a blank name or a malformed
/// record are skipped with a warning. Failing to read the underlying source aborts the load.
fn parse_player_rows<R: Read>(rdr: R) -> Result<Vec<PlayerRecord>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);

    let mut players = Vec::new();
    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(row) => match player_from_row(&row) {
                Some(player) => players.push(player),
                None => warn!(line = line + 1, row = ?row, "skipping unusable player row"),
            },
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e),
            Err(e) => {
                warn!(line = line + 1, "skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

fn player_from_row(row: &StringRecord) -> Option<PlayerRecord> {
    let position: Position = row.get(0)?.parse().ok()?;
    let name = row.get(1).filter(|name| !name.is_empty())?;
    let team = row.get(2).unwrap_or_default();
    Some(PlayerRecord::new(position, name, team))
}
