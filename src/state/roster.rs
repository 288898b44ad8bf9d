use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::error;

use crate::state::{pool::Position, schedule::PickRecord};

/// Per-team, per-position drafted counts.
pub type RosterCounts = IndexMap<String, IndexMap<Position, u32>>;

/// Cache of roster counts derived from the pick records, with position caps.
#[derive(Debug, Clone)]
pub struct RosterLedger {
    caps: HashMap<Position, u32>,
    counts: RosterCounts,
}

impl RosterLedger {
    /// Zeroed ledger for `teams`. Positions without a cap are unlimited.
    pub fn new(teams: &[String], caps: HashMap<Position, u32>) -> Self {
        let counts = teams
            .iter()
            .map(|team| (team.clone(), zeroed()))
            .collect();
        Self { caps, counts }
    }

    /// Cap for `position`, `None` when unlimited.
    pub fn cap(&self, position: Position) -> Option<u32> {
        self.caps.get(&position).copied()
    }

    /// Players `team` holds at `position`.
    pub fn count(&self, team: &str, position: Position) -> u32 {
        self.counts
            .get(team)
            .and_then(|positions| positions.get(&position))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `team` may add another player at `position`.
    pub fn can_draft(&self, team: &str, position: Position) -> bool {
        match self.cap(position) {
            Some(cap) => self.count(team, position) < cap,
            None => true,
        }
    }

    /// Record one more player at `position` for `team`.
    pub fn increment(&mut self, team: &str, position: Position) {
        *self.slot(team, position) += 1;
    }

    /// Decrease a count. Going below zero means the cache drifted from the pick records;
    /// it is logged and the count stays at zero.
    pub fn decrement(&mut self, team: &str, position: Position) {
        let count = self.slot(team, position);
        if *count == 0 {
            error!(team, %position, "roster count underflow; ledger out of sync with picks");
            return;
        }
        *count -= 1;
    }

    /// Recount everything from the authoritative pick records.
    pub fn rebuild_from(&mut self, records: &[PickRecord]) {
        for positions in self.counts.values_mut() {
            *positions = zeroed();
        }
        for record in records {
            if let Some(player) = record.player() {
                self.increment(record.team(), player.position);
            }
        }
    }

    /// Every team's counts.
    pub fn counts(&self) -> &RosterCounts {
        &self.counts
    }

    fn slot(&mut self, team: &str, position: Position) -> &mut u32 {
        self.counts
            .entry(team.to_string())
            .or_insert_with(zeroed)
            .entry(position)
            .or_insert(0)
    }
}

fn zeroed() -> IndexMap<Position, u32> {
    Position::ALL.iter().map(|position| (*position, 0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{pool::PlayerRecord, schedule::PickSchedule};

    fn teams() -> Vec<String> {
        vec!["Lions".to_string(), "Wolves".to_string()]
    }

    fn caps() -> HashMap<Position, u32> {
        HashMap::from([(Position::Goalkeeper, 1), (Position::Forward, 2)])
    }

    #[test]
    fn caps_apply_per_team_and_missing_caps_are_unlimited() {
        let mut ledger = RosterLedger::new(&teams(), caps());
        ledger.increment("Lions", Position::Goalkeeper);

        assert!(!ledger.can_draft("Lions", Position::Goalkeeper));
        assert!(ledger.can_draft("Wolves", Position::Goalkeeper));

        for _ in 0..50 {
            ledger.increment("Lions", Position::Midfielder);
        }
        assert!(ledger.can_draft("Lions", Position::Midfielder));
    }

    #[test]
    fn decrement_never_goes_below_zero() {
        let mut ledger = RosterLedger::new(&teams(), caps());
        ledger.increment("Wolves", Position::Forward);
        ledger.decrement("Wolves", Position::Forward);
        ledger.decrement("Wolves", Position::Forward);
        assert_eq!(ledger.count("Wolves", Position::Forward), 0);
    }

    #[test]
    fn rebuild_is_idempotent_and_ignores_skips() {
        let mut schedule = PickSchedule::snake(&teams(), 2);
        schedule
            .get_mut(0)
            .unwrap()
            .draft(PlayerRecord::new(Position::Forward, "Victor Osimhen", "Napoli"));
        schedule.get_mut(1).unwrap().skip();
        schedule
            .get_mut(2)
            .unwrap()
            .draft(PlayerRecord::new(Position::Goalkeeper, "Alex Meret", "Napoli"));

        let mut ledger = RosterLedger::new(&teams(), caps());
        ledger.increment("Lions", Position::Defender);

        ledger.rebuild_from(schedule.records());
        let first = ledger.counts().clone();
        ledger.rebuild_from(schedule.records());

        assert_eq!(&first, ledger.counts());
        assert_eq!(ledger.count("Lions", Position::Forward), 1);
        assert_eq!(ledger.count("Lions", Position::Defender), 0);
        assert_eq!(ledger.count("Wolves", Position::Goalkeeper), 1);
        assert_eq!(ledger.counts()["Wolves"].values().sum::<u32>(), 1);
    }
}
