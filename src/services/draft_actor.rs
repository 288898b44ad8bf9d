//! Single task owning the draft. Every intent, query and timer tick goes through its queue,
//! so operations are applied one at a time and broadcasts always follow the mutation that
//! caused them.

use std::{ops::ControlFlow, sync::Arc};

use indexmap::IndexMap;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    dto::{
        draft::{DraftExport, DraftSnapshot},
        ws::{
            AdminLoginOutcome, ServerMessage, TeamSelectionOutcome, TimerTickPayload,
            TurnStatusPayload, WatchlistsPayload,
        },
    },
    error::{DraftError, ServiceError},
    state::{
        broadcast::Broadcaster,
        coordinator::{DraftCoordinator, DraftNotice, TurnStatus},
        pool::{PlayerRecord, PoolFilter},
        session::{ConnectionId, Principal, SessionAuthority},
        state_machine::DraftPhase,
        timer::TurnTimer,
    },
};

const QUEUE_CAPACITY: usize = 256;

/// Who sent an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    /// A WebSocket connection; rights come from its session.
    Connection(ConnectionId),
    /// A REST caller that already proved the admin secret.
    Admin,
}

/// Mutations a client can ask for.
#[derive(Debug, Clone)]
pub enum DraftIntent {
    /// Bind the connection to a team.
    SelectTeam {
        /// Team to act for.
        team: String,
        /// That team's secret.
        secret: String,
    },
    /// Grant the connection admin rights.
    AdminLogin {
        /// Configured admin secret.
        secret: String,
    },
    /// Draft a player for the team on the clock.
    SubmitPick {
        /// Player name.
        player: String,
    },
    /// Overwrite or clear any pick.
    ForceSetPick {
        /// Zero-based pick index.
        index: usize,
        /// New occupant, `None` to clear.
        player: Option<String>,
    },
    /// Stop the clock.
    Pause,
    /// Restart the clock.
    Resume,
    /// Change the per-pick duration.
    SetTimer {
        /// New duration; must be positive.
        seconds: i64,
    },
    /// Replace a team's watchlist.
    UpdateWatchlist {
        /// Team whose list is replaced.
        team: String,
        /// Player names in preference order.
        players: Vec<String>,
    },
    /// Replace the undrafted pool.
    UploadPlayerPool {
        /// New pool in preference order.
        players: Vec<PlayerRecord>,
    },
}

impl DraftIntent {
    /// Session intents answer with their own outcome message instead of a rejection.
    fn reports_own_outcome(&self) -> bool {
        matches!(
            self,
            DraftIntent::SelectTeam { .. } | DraftIntent::AdminLogin { .. }
        )
    }
}

/// Everything the actor consumes.
#[derive(Debug)]
pub enum DraftCommand {
    /// A socket registered with the broadcaster and wants its initial snapshot.
    Connect {
        /// The new connection.
        connection: ConnectionId,
    },
    /// A socket closed.
    Disconnect {
        /// The closed connection.
        connection: ConnectionId,
    },
    /// A mutation, optionally awaiting its outcome.
    Intent {
        /// Who asked.
        requester: Requester,
        /// What was asked.
        intent: DraftIntent,
        /// Receives the outcome when the caller waits for it.
        reply: Option<oneshot::Sender<Result<(), DraftError>>>,
    },
    /// One countdown second, tagged with the countdown it belongs to.
    Tick {
        /// Countdown the tick belongs to.
        epoch: u64,
    },
    /// Read the full state.
    Snapshot {
        /// Receives the snapshot.
        reply: oneshot::Sender<DraftSnapshot>,
    },
    /// Read the results export.
    Export {
        /// Receives the export.
        reply: oneshot::Sender<DraftExport>,
    },
    /// Read a filtered pool view.
    Players {
        /// Criteria to match.
        filter: PoolFilter,
        /// Receives the matching players.
        reply: oneshot::Sender<Vec<PlayerRecord>>,
    },
    /// Read all watchlists.
    Watchlists {
        /// Receives every watchlist.
        reply: oneshot::Sender<IndexMap<String, Vec<String>>>,
    },
    /// Read the lifecycle phase.
    Phase {
        /// Receives the phase.
        reply: oneshot::Sender<DraftPhase>,
    },
    /// Stop the actor and close every WebSocket, even while handles are still alive.
    Shutdown,
}

/// Cloneable sender side of the draft queue.
#[derive(Debug, Clone)]
pub struct DraftHandle {
    commands: mpsc::Sender<DraftCommand>,
}

impl DraftHandle {
    /// Register a connection and send it the initial snapshot.
    pub async fn connect(&self, connection: ConnectionId) -> Result<(), ServiceError> {
        self.send(DraftCommand::Connect { connection }).await
    }

    /// Release the connection's session.
    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), ServiceError> {
        self.send(DraftCommand::Disconnect { connection }).await
    }

    /// Queue an intent without waiting for its outcome. Rejections reach the connection as
    /// `operation_rejected`.
    pub async fn post(
        &self,
        requester: Requester,
        intent: DraftIntent,
    ) -> Result<(), ServiceError> {
        self.send(DraftCommand::Intent {
            requester,
            intent,
            reply: None,
        })
        .await
    }

    /// Queue an intent and wait until it has been applied or rejected.
    pub async fn submit(
        &self,
        requester: Requester,
        intent: DraftIntent,
    ) -> Result<(), ServiceError> {
        let outcome = self
            .request(|reply| DraftCommand::Intent {
                requester,
                intent,
                reply: Some(reply),
            })
            .await?;
        Ok(outcome?)
    }

    /// Current full state.
    pub async fn snapshot(&self) -> Result<DraftSnapshot, ServiceError> {
        self.request(|reply| DraftCommand::Snapshot { reply }).await
    }

    /// Results export.
    pub async fn export(&self) -> Result<DraftExport, ServiceError> {
        self.request(|reply| DraftCommand::Export { reply }).await
    }

    /// Undrafted players matching `filter`.
    pub async fn players(&self, filter: PoolFilter) -> Result<Vec<PlayerRecord>, ServiceError> {
        self.request(|reply| DraftCommand::Players { filter, reply })
            .await
    }

    /// Every team's watchlist.
    pub async fn watchlists(&self) -> Result<IndexMap<String, Vec<String>>, ServiceError> {
        self.request(|reply| DraftCommand::Watchlists { reply }).await
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> Result<DraftPhase, ServiceError> {
        self.request(|reply| DraftCommand::Phase { reply }).await
    }

    /// Stop the actor. Queued commands ahead of this one are still applied.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.send(DraftCommand::Shutdown).await
    }

    async fn send(&self, command: DraftCommand) -> Result<(), ServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServiceError::Unavailable)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> DraftCommand,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply)).await?;
        response.await.map_err(|_| ServiceError::Unavailable)
    }
}

/// Start the actor on an already initialized coordinator.
pub fn spawn(
    coordinator: DraftCoordinator,
    sessions: SessionAuthority,
    broadcaster: Arc<Broadcaster>,
) -> (DraftHandle, JoinHandle<()>) {
    let (commands, queue) = mpsc::channel(QUEUE_CAPACITY);
    let actor = DraftActor {
        coordinator,
        sessions,
        broadcaster,
        timer: TurnTimer::new(),
        ticks: commands.downgrade(),
    };
    let task = tokio::spawn(actor.run(queue));
    (DraftHandle { commands }, task)
}

struct DraftActor {
    coordinator: DraftCoordinator,
    sessions: SessionAuthority,
    broadcaster: Arc<Broadcaster>,
    timer: TurnTimer,
    /// Weak so the queue closes once every external handle is gone.
    ticks: mpsc::WeakSender<DraftCommand>,
}

impl DraftActor {
    async fn run(mut self, mut queue: mpsc::Receiver<DraftCommand>) {
        info!("draft actor started");
        self.sync_timer();
        while let Some(command) = queue.recv().await {
            if self.handle(command).is_break() {
                break;
            }
            self.sync_timer();
        }
        self.timer.cancel();
        self.broadcaster.close_all();
        info!("draft actor stopped");
    }

    fn handle(&mut self, command: DraftCommand) -> ControlFlow<()> {
        match command {
            DraftCommand::Connect { connection } => {
                let snapshot = DraftSnapshot::from(&self.coordinator);
                self.broadcaster
                    .send_to(connection, &ServerMessage::InitialSnapshot(snapshot));
                self.send_turn_status(connection);
            }
            DraftCommand::Disconnect { connection } => {
                self.sessions.disconnect(connection);
                debug!(%connection, "session released");
            }
            DraftCommand::Intent {
                requester,
                intent,
                reply,
            } => {
                let own_outcome = intent.reports_own_outcome();
                let outcome = self.apply(requester, intent);
                match &outcome {
                    Ok(notices) => self.publish(notices),
                    Err(err) => {
                        warn!(?requester, code = err.code(), error = %err, "intent rejected");
                        if let (Requester::Connection(connection), false) = (requester, own_outcome)
                        {
                            self.broadcaster
                                .send_to(connection, &ServerMessage::rejected(err));
                        }
                    }
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome.map(|_| ()));
                }
            }
            DraftCommand::Tick { epoch } => {
                let notices = self.coordinator.tick(epoch);
                self.publish(&notices);
            }
            DraftCommand::Snapshot { reply } => {
                let _ = reply.send(DraftSnapshot::from(&self.coordinator));
            }
            DraftCommand::Export { reply } => {
                let _ = reply.send(DraftExport::from(&self.coordinator));
            }
            DraftCommand::Players { filter, reply } => {
                let _ = reply.send(self.coordinator.filtered_players(&filter));
            }
            DraftCommand::Watchlists { reply } => {
                let _ = reply.send(self.coordinator.watchlists().all().clone());
            }
            DraftCommand::Phase { reply } => {
                let _ = reply.send(self.coordinator.phase());
            }
            DraftCommand::Shutdown => {
                info!("draft actor shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn apply(
        &mut self,
        requester: Requester,
        intent: DraftIntent,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        let principal = match requester {
            Requester::Admin => Principal::admin(),
            Requester::Connection(connection) => self.sessions.principal(connection),
        };

        match intent {
            DraftIntent::SelectTeam { team, secret } => {
                let connection = live_connection(requester)?;
                self.select_team(connection, &team, &secret)
            }
            DraftIntent::AdminLogin { secret } => {
                let connection = live_connection(requester)?;
                let result = self.sessions.admin_login(connection, &secret);
                self.broadcaster.send_to(
                    connection,
                    &ServerMessage::AdminLoginOutcome(AdminLoginOutcome {
                        success: result.is_ok(),
                    }),
                );
                result?;
                info!(%connection, "admin logged in");
                Ok(Vec::new())
            }
            DraftIntent::SubmitPick { player } => {
                self.coordinator.submit_pick(&principal, &player)
            }
            DraftIntent::ForceSetPick { index, player } => {
                self.coordinator
                    .force_set_pick(&principal, index, player.as_deref())
            }
            DraftIntent::Pause => self.coordinator.pause(&principal),
            DraftIntent::Resume => self.coordinator.resume(&principal),
            DraftIntent::SetTimer { seconds } => {
                self.coordinator.set_timer_duration(&principal, seconds)
            }
            DraftIntent::UpdateWatchlist { team, players } => {
                self.coordinator.update_watchlist(&principal, &team, players)
            }
            DraftIntent::UploadPlayerPool { players } => {
                self.coordinator.replace_pool(&principal, players)
            }
        }
    }

    fn select_team(
        &mut self,
        connection: ConnectionId,
        team: &str,
        secret: &str,
    ) -> Result<Vec<DraftNotice>, DraftError> {
        let result = self.sessions.select_team(connection, team, secret);
        self.broadcaster.send_to(
            connection,
            &ServerMessage::TeamSelectionOutcome(TeamSelectionOutcome {
                success: result.is_ok(),
                team: team.to_string(),
                message: result.as_ref().err().map(ToString::to_string),
            }),
        );
        let evicted = result?;

        info!(%connection, team, "team selected");
        self.send_turn_status(connection);
        if let Some(previous) = evicted {
            info!(connection = %previous, team, "previous holder of the team evicted");
            self.broadcaster.send_to(
                previous,
                &ServerMessage::TeamSelectionOutcome(TeamSelectionOutcome {
                    success: false,
                    team: team.to_string(),
                    message: Some("team claimed by another connection".into()),
                }),
            );
            self.send_turn_status(previous);
        }
        Ok(Vec::new())
    }

    /// Translate coordinator notices into outbound messages, most urgent first.
    fn publish(&self, notices: &[DraftNotice]) {
        for notice in notices {
            if let DraftNotice::TimerTick { remaining_seconds } = notice {
                self.broadcaster
                    .broadcast(&ServerMessage::TimerTick(TimerTickPayload {
                        remaining_seconds: *remaining_seconds,
                        current_pick_index: self.coordinator.cursor(),
                    }));
            }
        }

        if notices.contains(&DraftNotice::StateChanged) {
            let snapshot = DraftSnapshot::from(&self.coordinator);
            self.broadcaster
                .broadcast(&ServerMessage::StateChanged(snapshot));
        }
        if notices.contains(&DraftNotice::DraftCompleted) {
            let export = DraftExport::from(&self.coordinator);
            self.broadcaster
                .broadcast(&ServerMessage::DraftCompleted(export));
        }
        if notices.contains(&DraftNotice::WatchlistsChanged) {
            self.broadcaster
                .broadcast(&ServerMessage::WatchlistsChanged(WatchlistsPayload {
                    watchlists: self.coordinator.watchlists().all().clone(),
                }));
        }
        if notices.contains(&DraftNotice::TurnChanged)
            || notices.contains(&DraftNotice::DraftCompleted)
        {
            let bound: Vec<ConnectionId> = self
                .sessions
                .bindings()
                .map(|(connection, _)| connection)
                .collect();
            for connection in bound {
                self.send_turn_status(connection);
            }
        }
    }

    fn send_turn_status(&self, connection: ConnectionId) {
        let team = self.sessions.bound_team(connection);
        let status = match team {
            Some(_) => self.coordinator.turn_status(team),
            None => TurnStatus::Neutral,
        };
        self.broadcaster.send_to(
            connection,
            &ServerMessage::TurnStatus(TurnStatusPayload {
                status,
                team: team.map(str::to_string),
            }),
        );
    }

    fn sync_timer(&mut self) {
        let countdown = self.coordinator.countdown();
        self.timer.sync(countdown, &self.ticks);
    }
}

fn live_connection(requester: Requester) -> Result<ConnectionId, DraftError> {
    match requester {
        Requester::Connection(connection) => Ok(connection),
        Requester::Admin => Err(DraftError::UnauthorizedOperation(
            "session intents need a live connection".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use axum::extract::ws::Message;
    use uuid::Uuid;

    use super::*;
    use crate::state::{coordinator::DraftSettings, pool::Position};

    struct Harness {
        handle: DraftHandle,
        broadcaster: Arc<Broadcaster>,
        task: JoinHandle<()>,
    }

    impl Harness {
        fn new(timer_seconds: u32, players: Vec<PlayerRecord>) -> Self {
            let mut coordinator = DraftCoordinator::new(
                DraftSettings {
                    teams: vec!["Lions".into(), "Tigers".into()],
                    rounds: 1,
                    roster_caps: HashMap::from([(Position::Goalkeeper, 1)]),
                    timer_seconds,
                },
                players,
            );
            coordinator.initialize().unwrap();
            let sessions = SessionAuthority::new(
                "admin",
                IndexMap::from([
                    ("Lions".to_string(), "1".to_string()),
                    ("Tigers".to_string(), "2".to_string()),
                ]),
            );
            let broadcaster = Arc::new(Broadcaster::new(64));
            let (handle, task) = spawn(coordinator, sessions, broadcaster.clone());
            Self {
                handle,
                broadcaster,
                task,
            }
        }

        async fn client(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
            let connection = Uuid::new_v4();
            let (tx, rx) = mpsc::unbounded_channel();
            self.broadcaster.register(connection, tx);
            self.handle.connect(connection).await.unwrap();
            (connection, rx)
        }
    }

    async fn next_of(
        rx: &mut mpsc::UnboundedReceiver<Message>,
        kind: &str,
    ) -> serde_json::Value {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(600), rx.recv())
                .await
                .expect("timed out waiting for message")
                .expect("socket channel closed");
            let Message::Text(text) = message else {
                continue;
            };
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if value["type"] == kind {
                return value["payload"].clone();
            }
        }
    }

    fn players() -> Vec<PlayerRecord> {
        vec![
            PlayerRecord::new(Position::Goalkeeper, "Mike Maignan", "Milan"),
            PlayerRecord::new(Position::Forward, "Lautaro Martínez", "Inter"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn connection_receives_snapshot_then_turn_status() {
        let harness = Harness::new(30, players());
        let (_, mut rx) = harness.client().await;

        let snapshot = next_of(&mut rx, "initial_snapshot").await;
        assert_eq!(snapshot["phase"], "paused");
        assert_eq!(snapshot["available_players"].as_array().unwrap().len(), 2);
        assert_eq!(next_of(&mut rx, "turn_status").await["status"], "neutral");
    }

    #[tokio::test(start_paused = true)]
    async fn team_selection_reports_outcome_and_turn() {
        let harness = Harness::new(30, players());
        let (conn, mut rx) = harness.client().await;

        let select = |secret: &str| DraftIntent::SelectTeam {
            team: "Lions".into(),
            secret: secret.into(),
        };
        let wrong = harness
            .handle
            .submit(Requester::Connection(conn), select("9"))
            .await;
        assert!(matches!(
            wrong,
            Err(ServiceError::Rejected(DraftError::InvalidCredential))
        ));
        assert_eq!(next_of(&mut rx, "team_selection_outcome").await["success"], false);

        harness
            .handle
            .submit(Requester::Connection(conn), select("1"))
            .await
            .unwrap();
        assert_eq!(next_of(&mut rx, "team_selection_outcome").await["success"], true);
        assert_eq!(next_of(&mut rx, "turn_status").await["status"], "on_clock");
    }

    #[tokio::test(start_paused = true)]
    async fn second_binder_evicts_the_first() {
        let harness = Harness::new(30, players());
        let (first, mut first_rx) = harness.client().await;
        let (second, _second_rx) = harness.client().await;
        let select = DraftIntent::SelectTeam {
            team: "Tigers".into(),
            secret: "2".into(),
        };

        harness
            .handle
            .submit(Requester::Connection(first), select.clone())
            .await
            .unwrap();
        assert_eq!(next_of(&mut first_rx, "team_selection_outcome").await["success"], true);
        assert_eq!(next_of(&mut first_rx, "turn_status").await["status"], "on_deck");

        harness
            .handle
            .submit(Requester::Connection(second), select)
            .await
            .unwrap();
        let outcome = next_of(&mut first_rx, "team_selection_outcome").await;
        assert_eq!(outcome["success"], false);
        let status = next_of(&mut first_rx, "turn_status").await;
        assert_eq!(status["status"], "neutral");
        assert_eq!(status["team"], serde_json::Value::Null);

        // The evicted connection can no longer pick for the team.
        let pick = harness
            .handle
            .submit(
                Requester::Connection(first),
                DraftIntent::SubmitPick {
                    player: "Mike Maignan".into(),
                },
            )
            .await;
        assert!(pick.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rejections_go_to_the_requesting_socket_only() {
        let harness = Harness::new(30, players());
        let (conn, mut rx) = harness.client().await;
        let (_, mut other_rx) = harness.client().await;

        harness
            .handle
            .post(Requester::Connection(conn), DraftIntent::Pause)
            .await
            .unwrap();

        let rejected = next_of(&mut rx, "operation_rejected").await;
        assert_eq!(rejected["code"], "unauthorized_operation");

        harness.handle.snapshot().await.unwrap();
        while let Ok(message) = other_rx.try_recv() {
            if let Message::Text(text) = message {
                assert!(!text.as_str().contains("operation_rejected"));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn admin_over_socket_picks_and_everyone_sees_it() {
        let harness = Harness::new(30, players());
        let (admin, mut admin_rx) = harness.client().await;
        let (_, mut watcher_rx) = harness.client().await;
        let mut sse = harness.broadcaster.public_sse().subscribe();

        harness
            .handle
            .submit(
                Requester::Connection(admin),
                DraftIntent::AdminLogin {
                    secret: "admin".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(next_of(&mut admin_rx, "admin_login_outcome").await["success"], true);

        harness
            .handle
            .submit(
                Requester::Connection(admin),
                DraftIntent::SubmitPick {
                    player: "Mike Maignan".into(),
                },
            )
            .await
            .unwrap();

        let state = next_of(&mut watcher_rx, "state_changed").await;
        assert_eq!(state["current_pick_index"], 1);
        assert_eq!(state["picks"][0]["player"]["name"], "Mike Maignan");
        assert_eq!(state["roster_counts"]["Lions"]["GK"], 1);
        assert_eq!(sse.recv().await.unwrap().event, "state_changed");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_auto_drafts_when_the_clock_runs_out() {
        let harness = Harness::new(3, players());
        let (_, mut rx) = harness.client().await;
        harness
            .handle
            .submit(
                Requester::Admin,
                DraftIntent::UpdateWatchlist {
                    team: "Lions".into(),
                    players: vec!["Lautaro Martínez".into()],
                },
            )
            .await
            .unwrap();
        harness
            .handle
            .submit(Requester::Admin, DraftIntent::Resume)
            .await
            .unwrap();

        assert_eq!(next_of(&mut rx, "timer_tick").await["remaining_seconds"], 2);
        assert_eq!(next_of(&mut rx, "timer_tick").await["remaining_seconds"], 1);
        assert_eq!(next_of(&mut rx, "timer_tick").await["remaining_seconds"], 0);
        let state = next_of(&mut rx, "state_changed").await;
        assert_eq!(state["picks"][0]["player"]["name"], "Lautaro Martínez");
        assert_eq!(state["timer"]["remaining_seconds"], 3);

        // Second pick expires too and completes the draft.
        let export = next_of(&mut rx, "draft_completed").await;
        assert_eq!(export["picks"][1]["player"], "Mike Maignan");

        let snapshot = harness.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.current_pick_index, 2);
        assert!(snapshot.available_players.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_the_countdown() {
        let harness = Harness::new(10, players());
        harness
            .handle
            .submit(Requester::Admin, DraftIntent::Resume)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        harness
            .handle
            .submit(Requester::Admin, DraftIntent::Pause)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        let snapshot = harness.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.timer.remaining_seconds, 6);
        assert!(snapshot.timer.is_paused);
        assert_eq!(snapshot.current_pick_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rest_admin_cannot_run_session_intents() {
        let harness = Harness::new(10, players());
        let result = harness
            .handle
            .submit(
                Requester::Admin,
                DraftIntent::AdminLogin {
                    secret: "admin".into(),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(DraftError::UnauthorizedOperation(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_a_running_draft_with_clients_attached() {
        let harness = Harness::new(30, players());
        let (_, mut rx) = harness.client().await;
        harness
            .handle
            .submit(Requester::Admin, DraftIntent::Resume)
            .await
            .unwrap();

        harness.handle.shutdown().await.unwrap();

        // The handle is still alive, as it would be inside an open socket task.
        tokio::time::timeout(Duration::from_secs(5), harness.task)
            .await
            .expect("actor still running after shutdown")
            .unwrap();
        let closed = loop {
            match rx.recv().await {
                Some(Message::Close(frame)) => break frame,
                Some(_) => continue,
                None => panic!("socket channel dropped without a close frame"),
            }
        };
        assert!(closed.is_none());
        assert!(matches!(
            harness.handle.snapshot().await,
            Err(ServiceError::Unavailable)
        ));
    }
}
