//! Read projections of the draft shared by the WebSocket, SSE and REST surfaces.

use std::time::SystemTime;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{format_system_time, phase::VisibleDraftPhase},
    state::{
        coordinator::{DraftCoordinator, TimerState},
        pool::{PlayerRecord, Position},
        roster::RosterCounts,
        schedule::PickRecord,
    },
};

/// One slot of the schedule as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PickView {
    /// Zero-based position in the schedule.
    pub index: usize,
    /// Round number, starting at 1.
    pub round: u32,
    /// Position inside the round, starting at 1.
    pub slot: u32,
    /// Team owning the pick.
    pub team: String,
    /// Drafted player, absent while the slot is open or when it was skipped.
    pub player: Option<PlayerRecord>,
    /// True when the clock expired with nothing draftable.
    pub skipped: bool,
}

impl PickView {
    fn new(index: usize, record: &PickRecord) -> Self {
        Self {
            index,
            round: record.round(),
            slot: record.slot(),
            team: record.team().to_string(),
            player: record.player().cloned(),
            skipped: record.selection().is_skipped(),
        }
    }
}

/// Full view of the draft, sent on connect and after every state change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DraftSnapshot {
    /// Lifecycle phase as seen by clients.
    pub phase: VisibleDraftPhase,
    /// Teams in first-round order.
    pub teams: Vec<String>,
    /// Every pick in schedule order.
    pub picks: Vec<PickView>,
    /// Index of the pick on the clock; equals the number of picks once completed.
    pub current_pick_index: usize,
    /// Team on the clock, absent once completed.
    pub current_team: Option<String>,
    /// Team picking next.
    pub on_deck_team: Option<String>,
    /// Countdown of the current pick.
    pub timer: TimerState,
    /// Undrafted players in pool order.
    pub available_players: Vec<PlayerRecord>,
    /// Team -> position -> number of drafted players.
    #[schema(value_type = Object)]
    pub roster_counts: RosterCounts,
    /// Position -> cap. Positions without a cap are unlimited.
    #[schema(value_type = Object)]
    pub roster_caps: IndexMap<Position, u32>,
    /// Team -> ordered watchlist.
    #[schema(value_type = Object)]
    pub watchlists: IndexMap<String, Vec<String>>,
}

impl From<&DraftCoordinator> for DraftSnapshot {
    fn from(draft: &DraftCoordinator) -> Self {
        Self {
            phase: draft.phase().into(),
            teams: draft.teams().to_vec(),
            picks: draft
                .schedule()
                .records()
                .iter()
                .enumerate()
                .map(|(index, record)| PickView::new(index, record))
                .collect(),
            current_pick_index: draft.cursor(),
            current_team: draft.current_team().map(str::to_string),
            on_deck_team: draft.on_deck_team().map(str::to_string),
            timer: draft.timer(),
            available_players: draft.pool().to_vec(),
            roster_counts: draft.ledger().counts().clone(),
            roster_caps: Position::ALL
                .into_iter()
                .filter_map(|position| Some((position, draft.ledger().cap(position)?)))
                .collect(),
            watchlists: draft.watchlists().all().clone(),
        }
    }
}

/// One line of the results export. Open and skipped slots keep their row so the export
/// mirrors the schedule one to one.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportRow {
    /// One-based overall pick number.
    pub pick: usize,
    /// Round number, starting at 1.
    pub round: u32,
    /// Position inside the round, starting at 1.
    pub slot: u32,
    /// Team owning the pick.
    pub team: String,
    /// Drafted player name, empty for open or skipped slots.
    pub player: Option<String>,
    /// Position of the drafted player.
    pub position: Option<Position>,
    /// Real-world club of the drafted player.
    pub origin_team: Option<String>,
    /// True when the clock expired with nothing draftable.
    pub skipped: bool,
}

impl ExportRow {
    fn new(index: usize, record: &PickRecord) -> Self {
        let player = record.player();
        Self {
            pick: index + 1,
            round: record.round(),
            slot: record.slot(),
            team: record.team().to_string(),
            player: player.map(|p| p.name.clone()),
            position: player.map(|p| p.position),
            origin_team: player.map(|p| p.origin_team.clone()),
            skipped: record.selection().is_skipped(),
        }
    }
}

/// Draft results, usable at any point of the draft.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DraftExport {
    /// Phase at export time.
    pub phase: VisibleDraftPhase,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    /// Every pick in schedule order.
    pub picks: Vec<ExportRow>,
}

impl From<&DraftCoordinator> for DraftExport {
    fn from(draft: &DraftCoordinator) -> Self {
        Self {
            phase: draft.phase().into(),
            exported_at: format_system_time(SystemTime::now()),
            picks: draft
                .schedule()
                .records()
                .iter()
                .enumerate()
                .map(|(index, record)| ExportRow::new(index, record))
                .collect(),
        }
    }
}

impl DraftExport {
    /// Render the rows as CSV with a header line.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.picks {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::state::{coordinator::DraftSettings, session::Principal};

    fn draft() -> DraftCoordinator {
        let mut draft = DraftCoordinator::new(
            DraftSettings {
                teams: vec!["Lions".into(), "Tigers".into()],
                rounds: 1,
                roster_caps: HashMap::from([(Position::Goalkeeper, 2)]),
                timer_seconds: 30,
            },
            vec![PlayerRecord::new(Position::Forward, "Rafael Leão", "Milan")],
        );
        draft.initialize().unwrap();
        draft
    }

    #[test]
    fn snapshot_reflects_cursor_and_caps() {
        let mut draft = draft();
        draft
            .submit_pick(&Principal::admin(), "Rafael Leão")
            .unwrap();

        let snapshot = DraftSnapshot::from(&draft);
        assert_eq!(snapshot.phase, VisibleDraftPhase::Paused);
        assert_eq!(snapshot.current_pick_index, 1);
        assert_eq!(snapshot.current_team.as_deref(), Some("Tigers"));
        assert_eq!(snapshot.on_deck_team, None);
        assert!(snapshot.available_players.is_empty());
        assert_eq!(snapshot.roster_caps.len(), 1);
        assert_eq!(snapshot.roster_counts["Lions"][&Position::Forward], 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["picks"][0]["player"]["position"], "FWD");
        assert_eq!(json["roster_caps"]["GK"], 2);
    }

    #[test]
    fn csv_export_keeps_every_slot() {
        let mut draft = draft();
        draft
            .submit_pick(&Principal::admin(), "Rafael Leão")
            .unwrap();
        draft.timer_expire().unwrap();

        let csv = DraftExport::from(&draft).to_csv().unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "pick,round,slot,team,player,position,origin_team,skipped",
                "1,1,1,Lions,Rafael Leão,FWD,Milan,false",
                "2,1,2,Tigers,,,,true",
            ]
        );
    }
}
