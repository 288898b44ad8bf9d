//! The draft engine: schedule cursor, pick validation, roster accounting, auto-draft and
//! admin overrides. Everything here is synchronous; exclusivity is provided by the single
//! task that owns the coordinator (see `services::draft_actor`).

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::{
    error::DraftError,
    state::{
        pool::{PlayerPool, PlayerRecord, PoolFilter, Position},
        roster::RosterLedger,
        schedule::PickSchedule,
        session::Principal,
        state_machine::{ClockState, DraftEvent, DraftPhase, DraftStateMachine},
        watchlist::WatchlistStore,
    },
};

/// Fixed parameters of a draft.
#[derive(Debug, Clone)]
pub struct DraftSettings {
    /// Team identifiers in first-round order.
    pub teams: Vec<String>,
    /// Number of snake rounds.
    pub rounds: u32,
    /// Maximum players per position per team. Missing positions are unlimited.
    pub roster_caps: HashMap<Position, u32>,
    /// Default seconds on the clock for each pick.
    pub timer_seconds: u32,
}

/// Countdown bookkeeping for the pick on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimerState {
    /// Seconds left for the current pick.
    pub remaining_seconds: u32,
    /// True while the clock is stopped.
    pub is_paused: bool,
    /// Full per-pick duration.
    pub duration_seconds: u32,
}

/// What changed after an operation, so the caller can notify observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftNotice {
    /// Picks, pool, cursor, timer settings or roster counts changed.
    StateChanged,
    /// One countdown second elapsed.
    TimerTick {
        /// Seconds left after this tick.
        remaining_seconds: u32,
    },
    /// A new pick is on the clock.
    TurnChanged,
    /// The last pick was made.
    DraftCompleted,
    /// A watchlist was replaced.
    WatchlistsChanged,
}

/// Position of a team relative to the pick on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The team owns the current pick.
    OnClock,
    /// The team owns the following pick.
    OnDeck,
    /// Anything else, including observers without a team.
    Neutral,
}

/// Owner of every piece of draft state.
#[derive(Debug, Clone)]
pub struct DraftCoordinator {
    settings: DraftSettings,
    machine: DraftStateMachine,
    schedule: PickSchedule,
    pool: PlayerPool,
    ledger: RosterLedger,
    watchlists: WatchlistStore,
    cursor: usize,
    timer: TimerState,
    epoch: u64,
}

impl DraftCoordinator {
    /// Create a coordinator that has not started yet, with `players` as the initial pool.
    pub fn new(settings: DraftSettings, players: Vec<PlayerRecord>) -> Self {
        let ledger = RosterLedger::new(&settings.teams, settings.roster_caps.clone());
        let watchlists = WatchlistStore::new(&settings.teams);
        let timer = TimerState {
            remaining_seconds: settings.timer_seconds,
            is_paused: true,
            duration_seconds: settings.timer_seconds,
        };
        Self {
            settings,
            machine: DraftStateMachine::new(),
            schedule: PickSchedule::default(),
            pool: PlayerPool::new(players),
            ledger,
            watchlists,
            cursor: 0,
            timer,
            epoch: 0,
        }
    }

    // ---------------------------------------------------------------------------
    // Read-only projections
    // ---------------------------------------------------------------------------

    /// Current lifecycle phase.
    pub fn phase(&self) -> DraftPhase {
        self.machine.phase()
    }

    /// The snake schedule with every selection.
    pub fn schedule(&self) -> &PickSchedule {
        &self.schedule
    }

    /// Undrafted players.
    pub fn pool(&self) -> &PlayerPool {
        &self.pool
    }

    /// Per-team position counts and caps.
    pub fn ledger(&self) -> &RosterLedger {
        &self.ledger
    }

    /// Per-team watchlists.
    pub fn watchlists(&self) -> &WatchlistStore {
        &self.watchlists
    }

    /// Index of the pick on the clock.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Countdown state.
    pub fn timer(&self) -> TimerState {
        self.timer
    }

    /// Teams in first-round order.
    pub fn teams(&self) -> &[String] {
        &self.settings.teams
    }

    /// Undrafted players matching `filter`, in pool order.
    pub fn filtered_players(&self, filter: &PoolFilter) -> Vec<PlayerRecord> {
        self.pool.filtered_view(filter)
    }

    /// Team owning the pick on the clock.
    pub fn current_team(&self) -> Option<&str> {
        self.schedule.team_at(self.cursor)
    }

    /// Team owning the pick after the one on the clock.
    pub fn on_deck_team(&self) -> Option<&str> {
        self.schedule.team_at(self.cursor + 1)
    }

    /// Where `team` stands relative to the clock.
    pub fn turn_status(&self, team: Option<&str>) -> TurnStatus {
        match team {
            Some(team) if self.current_team() == Some(team) => TurnStatus::OnClock,
            Some(team) if self.on_deck_team() == Some(team) => TurnStatus::OnDeck,
            _ => TurnStatus::Neutral,
        }
    }

    /// Epoch of the countdown that should be ticking, or `None` when the clock is stopped.
    pub fn countdown(&self) -> Option<u64> {
        self.machine.is_running().then_some(self.epoch)
    }

    // ---------------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------------

    /// Build the snake schedule and wait, paused, for an admin to start the clock.
    pub fn initialize(&mut self) -> Result<Vec<DraftNotice>, DraftError> {
        self.machine.apply(DraftEvent::Initialize)?;

        self.schedule = PickSchedule::snake(&self.settings.teams, self.settings.rounds);
        self.ledger.rebuild_from(self.schedule.records());
        self.cursor = 0;
        self.timer.is_paused = true;
        self.timer.remaining_seconds = self.timer.duration_seconds;

        info!(
            teams = self.settings.teams.len(),
            rounds = self.settings.rounds,
            picks = self.schedule.len(),
            pool = self.pool.len(),
            "draft initialized"
        );

        let mut notices = vec![DraftNotice::StateChanged];
        if self.schedule.is_empty() {
            notices.extend(self.finish());
        } else {
            notices.push(DraftNotice::TurnChanged);
        }
        Ok(notices)
    }

    /// Admin stops the clock, keeping the seconds left.
    pub fn pause(&mut self, principal: &Principal) -> Result<Vec<DraftNotice>, DraftError> {
        require_admin(principal, "pause the draft")?;
        if self.ensure_in_progress()? == ClockState::Paused {
            return Ok(Vec::new());
        }
        self.machine.apply(DraftEvent::Pause)?;
        self.timer.is_paused = true;
        info!(
            remaining = self.timer.remaining_seconds,
            version = self.machine.version(),
            "draft paused"
        );
        Ok(vec![DraftNotice::StateChanged])
    }

    /// Admin restarts the clock from the seconds left at pause time.
    pub fn resume(&mut self, principal: &Principal) -> Result<Vec<DraftNotice>, DraftError> {
        require_admin(principal, "resume the draft")?;
        if self.ensure_in_progress()? == ClockState::Running {
            return Ok(Vec::new());
        }
        self.machine.apply(DraftEvent::Resume)?;
        self.timer.is_paused = false;
        self.epoch += 1;
        info!(
            remaining = self.timer.remaining_seconds,
            version = self.machine.version(),
            "draft resumed"
        );
        Ok(vec![DraftNotice::StateChanged])
    }

    /// Admin changes the per-pick duration. The pick on the clock starts over from the new
    /// full duration; elapsed time is not carried over.
    pub fn set_timer_duration(
        &mut self,
        principal: &Principal,
        seconds: i64,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        require_admin(principal, "change the pick timer")?;
        let seconds = u32::try_from(seconds)
            .ok()
            .filter(|seconds| *seconds > 0)
            .ok_or_else(|| {
                DraftError::InvalidConfiguration(format!(
                    "timer duration must be a positive number of seconds (got {seconds})"
                ))
            })?;

        self.timer.duration_seconds = seconds;
        if self.machine.phase() != DraftPhase::Completed {
            self.timer.remaining_seconds = seconds;
        }
        if self.machine.is_running() {
            self.epoch += 1;
        }
        info!(seconds, "pick timer duration changed");
        Ok(vec![DraftNotice::StateChanged])
    }

    // ---------------------------------------------------------------------------
    // Picks
    // ---------------------------------------------------------------------------

    /// Draft `player_name` for the team on the clock.
    pub fn submit_pick(
        &mut self,
        principal: &Principal,
        player_name: &str,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        if self.ensure_in_progress()? == ClockState::Paused && !principal.admin {
            return Err(DraftError::DraftPaused);
        }
        let team = self
            .current_team()
            .ok_or(DraftError::DraftCompleted)?
            .to_string();
        if !principal.speaks_for(&team) {
            return Err(DraftError::UnauthorizedOperation(format!(
                "`{team}` is on the clock"
            )));
        }
        let player = self
            .pool
            .find_by_name(player_name)
            .cloned()
            .ok_or_else(|| DraftError::UnknownPlayer(player_name.to_string()))?;
        if !self.has_room(self.cursor, player.position) {
            return Err(DraftError::RosterCapExceeded {
                team,
                position: player.position,
            });
        }

        info!(
            index = self.cursor,
            team = %team,
            player = %player.name,
            position = %player.position,
            admin = principal.admin,
            "pick made"
        );
        self.assign(self.cursor, player);
        Ok(self.advance())
    }

    /// Auto-draft for the team on the clock: first watchlisted player that fits, then the
    /// first pool player that fits, otherwise the pick is skipped. A slot an admin already
    /// filled is kept as is.
    pub fn timer_expire(&mut self) -> Result<Vec<DraftNotice>, DraftError> {
        self.ensure_in_progress()?;
        let index = self.cursor;
        let record = self.schedule.get(index).ok_or(DraftError::DraftCompleted)?;
        let team = record.team().to_string();

        if let Some(player) = record.player() {
            info!(index, team = %team, player = %player.name, "clock expired on a pre-filled pick");
            return Ok(self.advance());
        }

        let choice = self
            .watchlists
            .first_available(&team, &self.pool, &self.ledger)
            .and_then(|name| self.pool.find_by_name(name))
            .or_else(|| {
                self.pool
                    .iter()
                    .find(|player| self.ledger.can_draft(&team, player.position))
            })
            .cloned();

        match choice {
            Some(player) => {
                info!(index, team = %team, player = %player.name, "auto-drafted on expiry");
                self.assign(index, player);
            }
            None => {
                info!(index, team = %team, "nothing draftable on expiry; pick skipped");
                if let Some(record) = self.schedule.get_mut(index) {
                    record.skip();
                }
            }
        }
        Ok(self.advance())
    }

    /// One second of countdown. Ticks from a superseded countdown are dropped.
    pub fn tick(&mut self, epoch: u64) -> Vec<DraftNotice> {
        if self.countdown() != Some(epoch) {
            debug!(epoch, current = self.epoch, "dropping stale tick");
            return Vec::new();
        }
        self.timer.remaining_seconds = self.timer.remaining_seconds.saturating_sub(1);
        let mut notices = vec![DraftNotice::TimerTick {
            remaining_seconds: self.timer.remaining_seconds,
        }];
        if self.timer.remaining_seconds == 0 {
            match self.timer_expire() {
                Ok(expired) => notices.extend(expired),
                Err(err) => error!(error = %err, "countdown expired outside of a running draft"),
            }
        }
        notices
    }

    /// Admin override of any pick, past, current or future. `None` empties the slot. The
    /// cursor does not move.
    ///
    /// Roster caps are enforced for the new player, counting the slot's previous occupant
    /// as already released.
    pub fn force_set_pick(
        &mut self,
        principal: &Principal,
        index: usize,
        player_name: Option<&str>,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        require_admin(principal, "override picks")?;
        if self.machine.phase() == DraftPhase::NotStarted {
            return Err(DraftError::NotStarted);
        }
        let record = self.schedule.get(index).ok_or(DraftError::InvalidIndex(index))?;

        let Some(name) = player_name else {
            let released = self.vacate(index);
            info!(
                index,
                released = released.as_ref().map(|player| player.name.as_str()),
                "pick cleared by admin"
            );
            return Ok(vec![DraftNotice::StateChanged]);
        };

        let player = self
            .pool
            .find_by_name(name)
            .or_else(|| record.player().filter(|current| current.name == name))
            .cloned()
            .ok_or_else(|| DraftError::UnknownPlayer(name.to_string()))?;
        if !self.has_room(index, player.position) {
            return Err(DraftError::RosterCapExceeded {
                team: record.team().to_string(),
                position: player.position,
            });
        }

        info!(index, team = %record.team(), player = %player.name, "pick overridden by admin");
        self.assign(index, player);
        Ok(vec![DraftNotice::StateChanged])
    }

    // ---------------------------------------------------------------------------
    // Watchlists and pool
    // ---------------------------------------------------------------------------

    /// Replace `team`'s watchlist. Only that team or an admin may do so.
    pub fn update_watchlist(
        &mut self,
        principal: &Principal,
        team: &str,
        names: Vec<String>,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        if !self.settings.teams.iter().any(|known| known == team) {
            return Err(DraftError::UnknownTeam(team.to_string()));
        }
        if !principal.speaks_for(team) {
            return Err(DraftError::UnauthorizedOperation(format!(
                "cannot edit the watchlist of `{team}`"
            )));
        }
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        debug!(team, entries = names.len(), "watchlist replaced");
        self.watchlists.replace(team, names);
        Ok(vec![DraftNotice::WatchlistsChanged])
    }

    /// Admin swaps the undrafted pool. Players already sitting in a pick are left out.
    pub fn replace_pool(
        &mut self,
        principal: &Principal,
        records: Vec<PlayerRecord>,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        require_admin(principal, "upload the player pool")?;
        let offered = records.len();
        let schedule = &self.schedule;
        self.pool.replace_all(
            records
                .into_iter()
                .filter(|record| !record.name.is_empty())
                .filter(|record| schedule.holder_of(&record.name).is_none()),
        );
        info!(offered, kept = self.pool.len(), "player pool replaced");
        Ok(vec![DraftNotice::StateChanged])
    }

    /// Recount the roster ledger from the pick records.
    pub fn rebuild_roster(&mut self) {
        self.ledger.rebuild_from(self.schedule.records());
    }

    // ---------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------

    fn ensure_in_progress(&self) -> Result<ClockState, DraftError> {
        match self.machine.phase() {
            DraftPhase::InProgress(clock) => Ok(clock),
            DraftPhase::NotStarted => Err(DraftError::NotStarted),
            DraftPhase::Completed => Err(DraftError::DraftCompleted),
        }
    }

    /// Whether `index`'s team can take one more player at `position`, with the slot's
    /// current occupant counted as released.
    fn has_room(&self, index: usize, position: Position) -> bool {
        let Some(record) = self.schedule.get(index) else {
            return false;
        };
        let Some(cap) = self.ledger.cap(position) else {
            return true;
        };
        let freed = record
            .player()
            .is_some_and(|current| current.position == position);
        let held = self.ledger.count(record.team(), position);
        held.saturating_sub(u32::from(freed)) < cap
    }

    /// Put `player` into slot `index`, releasing any previous occupant first.
    fn assign(&mut self, index: usize, player: PlayerRecord) {
        self.vacate(index);
        let Some(record) = self.schedule.get_mut(index) else {
            return;
        };
        self.pool.remove(&player.name);
        self.ledger.increment(record.team(), player.position);
        record.draft(player);
    }

    /// Empty slot `index`, returning its player (if any) to the pool and the roster count.
    fn vacate(&mut self, index: usize) -> Option<PlayerRecord> {
        let record = self.schedule.get_mut(index)?;
        let previous = record.clear()?;
        self.ledger.decrement(record.team(), previous.position);
        self.pool.add(previous.clone());
        Some(previous)
    }

    /// Shared post-pick path: move the cursor, then either finish or put the next pick on a
    /// fresh clock.
    fn advance(&mut self) -> Vec<DraftNotice> {
        self.cursor = (self.cursor + 1).min(self.schedule.len());
        let mut notices = vec![DraftNotice::StateChanged];
        if self.cursor == self.schedule.len() {
            notices.extend(self.finish());
            return notices;
        }
        self.timer.remaining_seconds = self.timer.duration_seconds;
        if self.machine.is_running() {
            self.epoch += 1;
        }
        notices.push(DraftNotice::TurnChanged);
        notices
    }

    fn finish(&mut self) -> Vec<DraftNotice> {
        if let Err(err) = self.machine.apply(DraftEvent::Finish) {
            error!(error = %err, "failed to finish the draft");
            return Vec::new();
        }
        self.timer.is_paused = true;
        self.timer.remaining_seconds = 0;
        info!(picks = self.schedule.len(), "draft completed");
        vec![DraftNotice::DraftCompleted]
    }
}

fn require_admin(principal: &Principal, action: &str) -> Result<(), DraftError> {
    if principal.admin {
        Ok(())
    } else {
        Err(DraftError::UnauthorizedOperation(format!(
            "only an admin may {action}"
        )))
    }
}
