//! Game-session core.
//!
//! All session state lives in one actor task. Commands from the presentation
//! layer, poll ticks, network results and the banner countdown are handled
//! one at a time on that task, so state transitions never interleave.
//! Network calls run as spawned tasks and report back as events tagged with
//! the [`SessionTicket`] they were issued under; results for a session that
//! has since been left are dropped.
//!
//! Presentation code holds a [`GameClient`] and observes read-only
//! [`ClientState`] values through a `watch` channel.

use crate::api::{GameApi, Joined, MoveAccepted, MoveRequest};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::poller::PollScheduler;
use crate::reconciler::{FetchSeq, Reconciler, Reconciliation};
use crate::selection::{ClickEffect, Selection};
use crate::surface::{self, Outcome, Surface};
use derive_getters::Getters;
use kings_valley::{Cell, GameId, GameSnapshot, PlayerInfo, PlayerName, PlayerNumber, RoomCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Identity of one live session. A new ticket is minted every time a session
/// starts, so responses can be matched to the session that asked for them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionTicket {
    epoch: u64,
    game_id: GameId,
}

/// Result of [`GameClient::select_or_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click changed nothing (not our turn, empty cell, move in flight,
    /// or the session ended meanwhile).
    Ignored,
    /// The cell became the move origin.
    Selected(Cell),
    /// The origin was released.
    Deselected,
    /// The service accepted the move.
    Moved {
        /// Winner, if the move ended the game.
        winner: Option<PlayerNumber>,
    },
    /// The service rejected the move, or it could not be sent.
    Rejected(ApiError),
}

/// Read-only view of an active session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionView {
    /// The local player.
    player: PlayerInfo,
    /// Latest authoritative snapshot.
    snapshot: GameSnapshot,
    /// Local selection.
    selection: Selection,
    /// Error banner, if showing.
    error: Option<String>,
    /// Winner, once a fetched snapshot shows the game finished.
    winner: Option<PlayerNumber>,
    /// Result for the local player, once known.
    outcome: Option<Outcome>,
    /// Whether the poll timer is running.
    polling: bool,
}

/// Everything the presentation layer may read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct ClientState {
    /// Lobby-level message from the last failed create or join.
    lobby_error: Option<String>,
    /// The active session, if any.
    session: Option<SessionView>,
}

/// Which lobby operation produced a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LobbyOp {
    Create,
    Join,
}

/// Who is waiting on a fetch.
#[derive(Debug)]
enum FetchWaiter {
    /// Scheduled poll; nobody.
    Poll,
    /// `refresh()` caller.
    Refresh(oneshot::Sender<Result<(), ApiError>>),
    /// The click whose accepted move triggered this fetch.
    Move {
        reply: oneshot::Sender<ClickOutcome>,
        winner: Option<PlayerNumber>,
    },
}

#[derive(Debug)]
enum Command {
    Enter {
        op: LobbyOp,
        room: Option<RoomCode>,
        name: PlayerName,
        reply: oneshot::Sender<Result<PlayerInfo, ApiError>>,
    },
    Click {
        cell: Cell,
        reply: oneshot::Sender<ClickOutcome>,
    },
    Refresh {
        reply: oneshot::Sender<Result<(), ApiError>>,
    },
    Leave {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

#[derive(Debug, Clone)]
enum Tick {
    Poll { epoch: u64 },
}

#[derive(Debug)]
enum Event {
    Tick(Tick),
    Entered {
        op: LobbyOp,
        result: Result<Joined, ApiError>,
        reply: oneshot::Sender<Result<PlayerInfo, ApiError>>,
    },
    Fetched {
        ticket: SessionTicket,
        seq: FetchSeq,
        result: Result<GameSnapshot, ApiError>,
        waiter: FetchWaiter,
    },
    MoveSettled {
        ticket: SessionTicket,
        result: Result<MoveAccepted, ApiError>,
        reply: oneshot::Sender<ClickOutcome>,
    },
}

impl From<Tick> for Event {
    fn from(tick: Tick) -> Self {
        Event::Tick(tick)
    }
}

/// State of one joined game.
struct ActiveSession {
    ticket: SessionTicket,
    player: PlayerInfo,
    snapshot: GameSnapshot,
    selection: Selection,
    surface: Surface,
    reconciler: Reconciler,
    poller: Option<PollScheduler>,
}

impl ActiveSession {
    /// The recorded winner, once the snapshot itself reports the game
    /// finished. A winning move response is held back until then.
    fn confirmed_winner(&self) -> Option<PlayerNumber> {
        self.surface
            .winner()
            .filter(|_| self.snapshot.status().is_terminal())
    }

    fn view(&self) -> SessionView {
        SessionView {
            player: self.player.clone(),
            snapshot: self.snapshot.clone(),
            selection: self.selection,
            error: self.surface.error().map(str::to_string),
            winner: self.confirmed_winner(),
            outcome: self
                .confirmed_winner()
                .and(self.surface.outcome_for(*self.player.number())),
            polling: self.poller.is_some(),
        }
    }
}

struct SessionActor {
    api: Arc<dyn GameApi>,
    poll_interval: Duration,
    error_ttl: Duration,
    epoch: u64,
    lobby_error: Option<String>,
    session: Option<ActiveSession>,
    events_tx: mpsc::UnboundedSender<Event>,
    ticks_tx: mpsc::UnboundedSender<Tick>,
    state_tx: watch::Sender<ClientState>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
        mut ticks: mpsc::UnboundedReceiver<Tick>,
    ) {
        info!("Session actor started");
        loop {
            let deadline = self.session.as_ref().and_then(|s| s.surface.deadline());
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = events.recv() => self.handle_event(event),
                Some(tick) = ticks.recv() => self.handle_event(tick.into()),
                _ = wait_until(deadline) => self.expire_banner(),
            }
            self.publish();
        }
        self.teardown();
        self.publish();
        info!("Session actor exiting");
    }

    fn publish(&self) {
        let next = ClientState {
            lobby_error: self.lobby_error.clone(),
            session: self.session.as_ref().map(ActiveSession::view),
        };
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Publishes first so the caller observes the effects of its own request.
    fn answer<T>(&self, reply: oneshot::Sender<T>, value: T) {
        self.publish();
        let _ = reply.send(value);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Enter {
                op,
                room,
                name,
                reply,
            } => self.enter(op, room, name, reply),
            Command::Click { cell, reply } => self.click(cell, reply),
            Command::Refresh { reply } => {
                if self.session.is_some() {
                    self.issue_fetch(FetchWaiter::Refresh(reply));
                } else {
                    debug!("Refresh without a session");
                    self.answer(reply, Ok(()));
                }
            }
            Command::Leave { reply } => {
                self.teardown();
                self.lobby_error = None;
                self.answer(reply, ());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick(Tick::Poll { epoch }) => self.poll(epoch),
            Event::Entered { op, result, reply } => self.entered(op, result, reply),
            Event::Fetched {
                ticket,
                seq,
                result,
                waiter,
            } => self.fetched(ticket, seq, result, waiter),
            Event::MoveSettled {
                ticket,
                result,
                reply,
            } => self.move_settled(ticket, result, reply),
        }
    }

    #[instrument(skip_all, fields(?op, name = %name))]
    fn enter(
        &mut self,
        op: LobbyOp,
        room: Option<RoomCode>,
        name: PlayerName,
        reply: oneshot::Sender<Result<PlayerInfo, ApiError>>,
    ) {
        self.lobby_error = None;
        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match &room {
                Some(room) => api.join_game(room, &name).await,
                None => api.create_game(&name).await,
            };
            let _ = events.send(Event::Entered { op, result, reply });
        });
    }

    fn entered(
        &mut self,
        op: LobbyOp,
        result: Result<Joined, ApiError>,
        reply: oneshot::Sender<Result<PlayerInfo, ApiError>>,
    ) {
        match result {
            Ok(joined) => {
                let player = joined.player().clone();
                self.start_session(joined);
                self.answer(reply, Ok(player));
            }
            Err(err) => {
                let message = match op {
                    LobbyOp::Create => surface::CREATE_FAILED_MESSAGE,
                    LobbyOp::Join => surface::join_failure_message(&err),
                };
                warn!(?op, error = %err, "Lobby operation failed");
                self.lobby_error = Some(message.to_string());
                self.answer(reply, Err(err));
            }
        }
    }

    #[instrument(skip_all, fields(game_id = %joined.snapshot().id(), number = %joined.player().number()))]
    fn start_session(&mut self, joined: Joined) {
        self.teardown();
        self.epoch += 1;

        let player = joined.player().clone();
        let snapshot = joined.snapshot().clone();
        let ticket = SessionTicket {
            epoch: self.epoch,
            game_id: snapshot.id().clone(),
        };

        let poller = (!snapshot.status().is_terminal()).then(|| {
            PollScheduler::start(
                self.poll_interval,
                self.ticks_tx.clone(),
                Tick::Poll { epoch: self.epoch },
            )
        });

        let mut surface = Surface::new(self.error_ttl);
        if let Some(winner) = *snapshot.winner() {
            surface.record_winner(winner);
        }

        info!(epoch = self.epoch, status = %snapshot.status(), "Session started");
        self.session = Some(ActiveSession {
            ticket,
            player,
            snapshot,
            selection: Selection::Idle,
            surface,
            reconciler: Reconciler::new(),
            poller,
        });
    }

    /// Ends the current session: stops polling and forgets all state. The
    /// epoch bump makes every in-flight response for it stale.
    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            info!(game_id = %session.ticket.game_id, epoch = session.ticket.epoch, "Leaving session");
            self.epoch += 1;
            drop(session);
        }
    }

    fn current(&mut self, ticket: &SessionTicket) -> Option<&mut ActiveSession> {
        self.session.as_mut().filter(|s| s.ticket == *ticket)
    }

    fn poll(&mut self, epoch: u64) {
        let live = self
            .session
            .as_ref()
            .is_some_and(|s| s.ticket.epoch == epoch && s.poller.is_some());
        if live {
            self.issue_fetch(FetchWaiter::Poll);
        } else {
            debug!(epoch, "Tick for an ended session ignored");
        }
    }

    fn issue_fetch(&mut self, waiter: FetchWaiter) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let seq = session.reconciler.issue();
        let ticket = session.ticket.clone();
        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        debug!(?seq, game_id = %ticket.game_id, "Fetching game");
        tokio::spawn(async move {
            let result = api.fetch_game(&ticket.game_id).await;
            let _ = events.send(Event::Fetched {
                ticket,
                seq,
                result,
                waiter,
            });
        });
    }

    fn fetched(
        &mut self,
        ticket: SessionTicket,
        seq: FetchSeq,
        result: Result<GameSnapshot, ApiError>,
        waiter: FetchWaiter,
    ) {
        let Some(session) = self.current(&ticket) else {
            debug!(?seq, "Late fetch for an ended session dropped");
            match waiter {
                FetchWaiter::Poll => {}
                FetchWaiter::Refresh(reply) => {
                    self.answer(reply, result.map(|_| ()));
                }
                FetchWaiter::Move { reply, winner } => {
                    self.answer(reply, ClickOutcome::Moved { winner });
                }
            }
            return;
        };

        let outcome = match result {
            Ok(snapshot) => {
                let reconciliation = session.reconciler.reconcile(
                    seq,
                    snapshot,
                    &mut session.snapshot,
                    &mut session.selection,
                    &mut session.surface,
                );
                match reconciliation {
                    Reconciliation::Applied {
                        winner_surfaced,
                        terminal,
                    } => {
                        if let Some(winner) = winner_surfaced {
                            info!(%winner, "Winner reported by snapshot");
                        }
                        if terminal && session.poller.take().is_some() {
                            info!("Game finished, polling stopped");
                        }
                        if matches!(waiter, FetchWaiter::Refresh(_)) {
                            session.surface.clear_error();
                        }
                        Ok(())
                    }
                    Reconciliation::Stale => Ok(()),
                    Reconciliation::ForeignGame => {
                        warn!(game_id = %ticket.game_id, "Service answered with another game");
                        Err(ApiError::network(format!(
                            "Service returned a different game than {}",
                            ticket.game_id
                        )))
                    }
                }
            }
            Err(err) => {
                match waiter {
                    FetchWaiter::Poll => warn!(error = %err, "Poll failed, keeping last snapshot"),
                    _ => warn!(error = %err, "Fetch failed"),
                }
                Err(err)
            }
        };

        match waiter {
            FetchWaiter::Poll => {}
            FetchWaiter::Refresh(reply) => {
                self.answer(reply, outcome);
            }
            FetchWaiter::Move { reply, winner } => {
                self.answer(reply, ClickOutcome::Moved { winner });
            }
        }
    }

    #[instrument(skip(self, reply))]
    fn click(&mut self, cell: Cell, reply: oneshot::Sender<ClickOutcome>) {
        let Some(session) = self.session.as_mut() else {
            self.answer(reply, ClickOutcome::Ignored);
            return;
        };

        let me = *session.player.number();
        let outcome = match session.selection.click(cell, &session.snapshot, me) {
            ClickEffect::Ignored => ClickOutcome::Ignored,
            ClickEffect::Selected(cell) => ClickOutcome::Selected(cell),
            ClickEffect::Deselected => ClickOutcome::Deselected,
            ClickEffect::Submit { from, to } => {
                let request = MoveRequest::new(
                    session.ticket.game_id.clone(),
                    session.player.id().clone(),
                    from,
                    to,
                );
                let ticket = session.ticket.clone();
                let api = Arc::clone(&self.api);
                let events = self.events_tx.clone();
                info!(%from, %to, "Submitting move");
                tokio::spawn(async move {
                    let result = api.submit_move(&request).await;
                    let _ = events.send(Event::MoveSettled {
                        ticket,
                        result,
                        reply,
                    });
                });
                return;
            }
        };
        self.answer(reply, outcome);
    }

    fn move_settled(
        &mut self,
        ticket: SessionTicket,
        result: Result<MoveAccepted, ApiError>,
        reply: oneshot::Sender<ClickOutcome>,
    ) {
        let Some(session) = self.current(&ticket) else {
            debug!("Move result for an ended session dropped");
            self.answer(reply, ClickOutcome::Ignored);
            return;
        };
        session.selection.settle();

        match result {
            Ok(accepted) => {
                session.surface.clear_error();
                if let Some(winner) = accepted.winner {
                    session.surface.record_winner(winner);
                }
                info!(winner = ?accepted.winner, "Move accepted, fetching result");
                self.issue_fetch(FetchWaiter::Move {
                    reply,
                    winner: accepted.winner,
                });
            }
            Err(err) => {
                warn!(error = %err, "Move failed");
                session
                    .surface
                    .set_error(surface::move_failure_message(&err), Instant::now());
                self.answer(reply, ClickOutcome::Rejected(err));
            }
        }
    }

    fn expire_banner(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.surface.expire(Instant::now());
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle to the session core.
///
/// Cheap to clone; the core stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct GameClient {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ClientState>,
}

impl GameClient {
    /// Spawns the session core on the current tokio runtime.
    #[instrument(skip_all, fields(poll_ms = config.poll_interval_ms(), error_ttl_ms = config.error_ttl_ms()))]
    pub fn spawn(api: Arc<dyn GameApi>, config: &ClientConfig) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ClientState::default());

        let actor = SessionActor {
            api,
            poll_interval: config.poll_interval(),
            error_ttl: config.error_ttl(),
            epoch: 0,
            lobby_error: None,
            session: None,
            events_tx,
            ticks_tx,
            state_tx,
        };
        tokio::spawn(actor.run(commands_rx, events_rx, ticks_rx));

        Self {
            commands: commands_tx,
            state: state_rx,
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Option<T> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(build(reply)).is_err() {
            warn!("Session actor is gone");
            return None;
        }
        response.await.ok()
    }

    /// Opens a new room and starts a session as player 1.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn create_game(&self, name: PlayerName) -> Result<PlayerInfo, ApiError> {
        self.request(|reply| Command::Enter {
            op: LobbyOp::Create,
            room: None,
            name,
            reply,
        })
        .await
        .unwrap_or_else(|| Err(ApiError::network("Session core stopped")))
    }

    /// Joins an existing room and starts a session.
    #[instrument(skip_all, fields(room = %room, name = %name))]
    pub async fn join_game(&self, room: RoomCode, name: PlayerName) -> Result<PlayerInfo, ApiError> {
        self.request(|reply| Command::Enter {
            op: LobbyOp::Join,
            room: Some(room),
            name,
            reply,
        })
        .await
        .unwrap_or_else(|| Err(ApiError::network("Session core stopped")))
    }

    /// Handles a click on `cell`: select, deselect or submit a move.
    #[instrument(skip(self))]
    pub async fn select_or_move(&self, cell: Cell) -> ClickOutcome {
        self.request(|reply| Command::Click { cell, reply })
            .await
            .unwrap_or(ClickOutcome::Ignored)
    }

    /// Fetches the authoritative state now. Failures are returned but never
    /// shown as a banner.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.request(|reply| Command::Refresh { reply })
            .await
            .unwrap_or_else(|| Err(ApiError::network("Session core stopped")))
    }

    /// Returns to the lobby, discarding the session.
    #[instrument(skip(self))]
    pub async fn leave_game(&self) {
        self.request(|reply| Command::Leave { reply }).await;
    }

    /// Current state.
    pub fn state(&self) -> ClientState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state.clone()
    }

    /// Stops the session core. Pending requests from other handles resolve
    /// as if the core were gone.
    pub fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            debug!("Session actor already stopped");
        }
    }
}
