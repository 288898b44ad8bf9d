use crate::state::pool::PlayerRecord;

/// Content of a single pick slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PickSelection {
    /// Nobody has been selected yet (or an admin cleared the slot).
    #[default]
    Open,
    /// The slot holds a drafted player.
    Drafted(PlayerRecord),
    /// The countdown expired with nothing draftable; the slot is intentionally empty.
    Skipped,
}

impl PickSelection {
    /// Drafted player, if any.
    pub fn player(&self) -> Option<&PlayerRecord> {
        match self {
            PickSelection::Drafted(player) => Some(player),
            _ => None,
        }
    }

    /// True when the pick was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, PickSelection::Skipped)
    }
}

/// One entry of the schedule. Round, slot and team are fixed at construction; only the
/// selection changes during the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRecord {
    round: u32,
    slot: u32,
    team: String,
    selection: PickSelection,
}

impl PickRecord {
    fn new(round: u32, slot: u32, team: String) -> Self {
        Self {
            round,
            slot,
            team,
            selection: PickSelection::Open,
        }
    }

    /// 1-indexed round.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// 1-indexed position within the round.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Team drafting at this slot.
    pub fn team(&self) -> &str {
        &self.team
    }

    /// What the slot currently holds.
    pub fn selection(&self) -> &PickSelection {
        &self.selection
    }

    /// Drafted player, if any.
    pub fn player(&self) -> Option<&PlayerRecord> {
        self.selection.player()
    }

    /// Put `player` in the slot, handing back whoever held it before.
    pub fn draft(&mut self, player: PlayerRecord) -> Option<PlayerRecord> {
        self.replace(PickSelection::Drafted(player))
    }

    /// Mark the slot as skipped, handing back whoever held it before.
    pub fn skip(&mut self) -> Option<PlayerRecord> {
        self.replace(PickSelection::Skipped)
    }

    /// Empty the slot, handing back whoever held it before.
    pub fn clear(&mut self) -> Option<PlayerRecord> {
        self.replace(PickSelection::Open)
    }

    fn replace(&mut self, selection: PickSelection) -> Option<PlayerRecord> {
        match std::mem::replace(&mut self.selection, selection) {
            PickSelection::Drafted(previous) => Some(previous),
            PickSelection::Open | PickSelection::Skipped => None,
        }
    }
}

/// Snake-order sequence of picks, fixed in length and order once built.
#[derive(Debug, Clone, Default)]
pub struct PickSchedule {
    records: Vec<PickRecord>,
}

impl PickSchedule {
    /// Build `teams.len() * rounds` open picks. Odd rounds follow `teams`, even rounds run
    /// in reverse.
    pub fn snake(teams: &[String], rounds: u32) -> Self {
        let mut records = Vec::with_capacity(teams.len() * rounds as usize);
        for round in 1..=rounds {
            let order: Box<dyn Iterator<Item = &String>> = if round % 2 == 1 {
                Box::new(teams.iter())
            } else {
                Box::new(teams.iter().rev())
            };
            for (index, team) in order.enumerate() {
                records.push(PickRecord::new(round, index as u32 + 1, team.clone()));
            }
        }
        Self { records }
    }

    /// Number of picks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for a schedule without picks.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pick at `index`.
    pub fn get(&self, index: usize) -> Option<&PickRecord> {
        self.records.get(index)
    }

    /// Mutable pick at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut PickRecord> {
        self.records.get_mut(index)
    }

    /// Team owning the pick at `index`.
    pub fn team_at(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(PickRecord::team)
    }

    /// Every pick in order.
    pub fn records(&self) -> &[PickRecord] {
        &self.records
    }

    /// Slot currently holding `name`, if any.
    pub fn holder_of(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.player().is_some_and(|player| player.name == name))
    }
}
