use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Roster position a player can be drafted at. Parsed case-insensitively, written upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String")]
pub enum Position {
    /// Goalkeeper.
    #[serde(rename = "GK")]
    Goalkeeper,
    /// Defender.
    #[serde(rename = "DEF")]
    Defender,
    /// Midfielder.
    #[serde(rename = "MID")]
    Midfielder,
    /// Forward.
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// Every position in roster display order.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Short label used on the wire and in CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown position `{0}`")]
pub struct UnknownPosition(pub String);

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GK" => Ok(Position::Goalkeeper),
            "DEF" => Ok(Position::Defender),
            "MID" => Ok(Position::Midfielder),
            "FWD" => Ok(Position::Forward),
            _ => Err(UnknownPosition(value.to_string())),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = UnknownPosition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A draftable player. The name is the identity key across the whole draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerRecord {
    /// Playing position.
    pub position: Position,
    /// Unique player name.
    pub name: String,
    /// Real-world club the player belongs to.
    pub origin_team: String,
}

impl PlayerRecord {
    /// Build a record, trimming surrounding whitespace from the text fields.
    pub fn new(
        position: Position,
        name: impl Into<String>,
        origin_team: impl Into<String>,
    ) -> Self {
        Self {
            position,
            name: name.into().trim().to_string(),
            origin_team: origin_team.into().trim().to_string(),
        }
    }
}

/// Criteria for a read-only projection of the pool. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolFilter {
    /// Case-insensitive substring of the player name.
    pub search: Option<String>,
    /// Exact position.
    pub position: Option<Position>,
    /// Exact origin team.
    pub origin_team: Option<String>,
}

impl PoolFilter {
    fn matches(&self, needle: Option<&str>, player: &PlayerRecord) -> bool {
        if let Some(needle) = needle {
            if !player.name.to_lowercase().contains(needle) {
                return false;
            }
        }
        if self.position.is_some_and(|position| position != player.position) {
            return false;
        }
        if let Some(team) = self.origin_team.as_deref() {
            if player.origin_team != team {
                return false;
            }
        }
        true
    }
}

/// Undrafted players in ingestion order.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: Vec<PlayerRecord>,
}

impl PlayerPool {
    /// Build a pool, keeping the first record for any repeated name.
    pub fn new(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let mut pool = Self::default();
        pool.replace_all(records);
        pool
    }

    /// Undrafted player named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|player| player.name == name)
    }

    /// Whether `name` is still undrafted.
    pub fn contains(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    /// Remove and return the named player. Absent names are not an error.
    pub fn remove(&mut self, name: &str) -> Option<PlayerRecord> {
        let index = self.players.iter().position(|player| player.name == name)?;
        Some(self.players.remove(index))
    }

    /// Re-insert a record at the end of the pool. Returns `false` when a player with the
    /// same name is already present.
    pub fn add(&mut self, record: PlayerRecord) -> bool {
        if self.contains(&record.name) {
            return false;
        }
        self.players.push(record);
        true
    }

    /// Swap the whole pool for `records`, dropping repeated names.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = PlayerRecord>) {
        self.players.clear();
        for record in records {
            self.add(record);
        }
    }

    /// Players matching `filter`, in pool order.
    pub fn filtered_view(&self, filter: &PoolFilter) -> Vec<PlayerRecord> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        self.players
            .iter()
            .filter(|player| filter.matches(needle.as_deref(), player))
            .cloned()
            .collect()
    }

    /// Players in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter()
    }

    /// Number of undrafted players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is left to draft.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Clone of the pool in iteration order.
    pub fn to_vec(&self) -> Vec<PlayerRecord> {
        self.players.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PlayerPool {
        PlayerPool::new([
            PlayerRecord::new(Position::Forward, "Lautaro Martinez", "Inter"),
            PlayerRecord::new(Position::Midfielder, "Nicolo Barella", "Inter"),
            PlayerRecord::new(Position::Goalkeeper, "Mike Maignan", "Milan"),
            PlayerRecord::new(Position::Forward, "Rafael Leao", "Milan"),
        ])
    }

    #[test]
    fn parses_positions_case_insensitively() {
        assert_eq!("gk".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!(" Fwd ".parse::<Position>().unwrap(), Position::Forward);
        assert!("ST".parse::<Position>().is_err());
    }

    #[test]
    fn json_positions_accept_any_case_and_serialize_upper_case() {
        let position: Position = serde_json::from_str("\"Gk\"").unwrap();
        assert_eq!(position, Position::Goalkeeper);
        assert!(serde_json::from_str::<Position>("\"Striker\"").is_err());
        assert_eq!(serde_json::to_string(&Position::Midfielder).unwrap(), "\"MID\"");
    }

    #[test]
    fn remove_is_a_no_op_when_absent() {
        let mut pool = pool();
        assert!(pool.remove("Rafael Leao").is_some());
        assert!(pool.remove("Rafael Leao").is_none());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn add_refuses_duplicate_names() {
        let mut pool = pool();
        assert!(!pool.add(PlayerRecord::new(Position::Forward, "Rafael Leao", "Milan")));
        assert_eq!(pool.len(), 4);

        let leao = pool.remove("Rafael Leao").unwrap();
        assert!(pool.add(leao));
        assert_eq!(pool.iter().last().unwrap().name, "Rafael Leao");
    }

    #[test]
    fn new_keeps_first_occurrence_of_a_name() {
        let pool = PlayerPool::new([
            PlayerRecord::new(Position::Forward, "Dusan Vlahovic", "Juventus"),
            PlayerRecord::new(Position::Midfielder, "Dusan Vlahovic", "Elsewhere"),
        ]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.find_by_name("Dusan Vlahovic").unwrap().position, Position::Forward);
    }

    #[test]
    fn filtered_view_combines_criteria_without_mutating() {
        let pool = pool();

        let by_name = pool.filtered_view(&PoolFilter {
            search: Some("LEAO".into()),
            ..PoolFilter::default()
        });
        assert_eq!(by_name.len(), 1);

        let inter_forwards = pool.filtered_view(&PoolFilter {
            search: None,
            position: Some(Position::Forward),
            origin_team: Some("Inter".into()),
        });
        assert_eq!(inter_forwards.len(), 1);
        assert_eq!(inter_forwards[0].name, "Lautaro Martinez");

        let blank_search = pool.filtered_view(&PoolFilter {
            search: Some("   ".into()),
            ..PoolFilter::default()
        });
        assert_eq!(blank_search.len(), 4);
        assert_eq!(pool.len(), 4);
    }
}
