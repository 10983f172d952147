use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use super::clock::Clock;
use super::cycle::{CycleHandle, RelocationCycle};
use super::error::{EngineError, Result};
use super::grid::{Direction, GridSize, Player, Position};
use super::random::RandomSource;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum GamePhase {
    #[default]
    Settings,
    InProgress,
    Win,
    Lose,
}

impl GamePhase {
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Win | GamePhase::Lose)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GamePhase::Settings => "in settings",
            GamePhase::InProgress => "in progress",
            GamePhase::Win => "won",
            GamePhase::Lose => "lost",
        };
        write!(f, "{}", s)
    }
}

/// GameState is the snapshot published to subscribers after every mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct GameState {
    pub(crate) phase: GamePhase,
    pub(crate) grid_size: GridSize,
    /// Number of target jumps since the current game started.
    pub(crate) catch_count: u32,
    pub(crate) target: Option<Position>,
    pub(crate) player1: Option<Position>,
    pub(crate) player2: Option<Position>,
    pub(crate) winner: Option<Player>,
}

impl GameState {
    pub(crate) fn position(&self, player: Player) -> Option<Position> {
        match player {
            Player::One => self.player1,
            Player::Two => self.player2,
        }
    }

    fn position_mut(&mut self, player: Player) -> &mut Option<Position> {
        match player {
            Player::One => &mut self.player1,
            Player::Two => &mut self.player2,
        }
    }
}

const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_WIN_THRESHOLD: u32 = 10;
/// Longest accepted relocation interval. Deadlines are `Instant`s, which cannot hold arbitrary
/// offsets.
pub(crate) const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) grid_size: GridSize,
    pub(crate) relocation_interval: Duration,
    /// Number of target jumps after which the game is lost.
    pub(crate) win_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: GridSize::default(),
            relocation_interval: DEFAULT_INTERVAL,
            win_threshold: DEFAULT_WIN_THRESHOLD,
        }
    }
}

impl Settings {
    pub(crate) fn new(grid_size: GridSize, interval_ms: f64, win_threshold: u32) -> Result<Self> {
        Ok(Self {
            grid_size,
            relocation_interval: interval_from_millis(interval_ms)?,
            win_threshold: validate_win_threshold(win_threshold)?,
        })
    }
}

fn interval_from_millis(ms: f64) -> Result<Duration> {
    if !ms.is_finite() {
        return Err(EngineError::InvalidArgument(format!(
            "relocation interval must be a number, got {ms}"
        )));
    }
    if ms <= 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "relocation interval must be positive, got {ms}"
        )));
    }
    let interval = Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|e| EngineError::InvalidArgument(format!("relocation interval {ms}: {e}")))?;
    validate_interval(interval)
}

fn validate_interval(interval: Duration) -> Result<Duration> {
    if interval.is_zero() {
        return Err(EngineError::InvalidArgument(
            "relocation interval must be positive".to_string(),
        ));
    }
    if interval > MAX_INTERVAL {
        return Err(EngineError::InvalidArgument(format!(
            "relocation interval must be at most {:?}, got {:?}",
            MAX_INTERVAL, interval
        )));
    }
    Ok(interval)
}

fn validate_win_threshold(threshold: u32) -> Result<u32> {
    if threshold == 0 {
        return Err(EngineError::InvalidArgument(
            "win threshold must be at least 1".to_string(),
        ));
    }
    Ok(threshold)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SubscriptionId(usize);

type Observer = Box<dyn FnMut(&GameState) -> anyhow::Result<()>>;

/// GameEngine owns the game state and is the only thing allowed to change it.
///
/// The engine never spawns threads or sleeps. The relocation cycle is a deadline: the driver
/// calls [`GameEngine::poll`] once [`GameEngine::next_deadline`] has passed, on the same thread
/// as every other call, so engine operations never overlap.
pub(crate) struct GameEngine {
    random: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    settings: Settings,
    state: GameState,
    cycle: Option<RelocationCycle>,
    cycles_started: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    subscriptions: usize,
}

// public methods
impl GameEngine {
    pub(crate) fn new(
        random: impl RandomSource + 'static,
        clock: impl Clock + 'static,
        settings: Settings,
    ) -> Self {
        let state = GameState {
            grid_size: settings.grid_size,
            ..GameState::default()
        };
        Self {
            random: Box::new(random),
            clock: Box::new(clock),
            settings,
            state,
            cycle: None,
            cycles_started: 0,
            observers: Vec::new(),
            subscriptions: 0,
        }
    }

    /// Register an observer called, in registration order, after every published mutation. An
    /// observer returning an error is logged and skipped; the rest are still called.
    pub(crate) fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&GameState) -> anyhow::Result<()> + 'static,
    {
        let id = SubscriptionId(self.subscriptions);
        self.subscriptions += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        before != self.observers.len()
    }

    /// Takes a millisecond count the way a settings form would hand it over; NaN and infinities
    /// are rejected as not being numbers.
    pub(crate) fn set_relocation_interval_ms(&mut self, ms: f64) -> Result<()> {
        let interval = interval_from_millis(ms)?;
        self.set_relocation_interval(interval)
    }

    /// A running cycle keeps its pending deadline; the new interval applies from the tick after.
    pub(crate) fn set_relocation_interval(&mut self, interval: Duration) -> Result<()> {
        self.settings.relocation_interval = validate_interval(interval)?;
        debug!("relocation interval set to {:?}", interval);
        self.notify();
        Ok(())
    }

    pub(crate) fn set_win_threshold(&mut self, threshold: u32) -> Result<()> {
        self.settings.win_threshold = validate_win_threshold(threshold)?;
        debug!("win threshold set to {}", threshold);
        self.notify();
        Ok(())
    }

    /// Refused while a game is running. The new size takes effect on the next start; positions
    /// left over from a finished game are cleared so none lies outside the new grid.
    pub(crate) fn set_grid_size(&mut self, grid_size: GridSize) -> Result<()> {
        if self.state.phase == GamePhase::InProgress {
            return Err(EngineError::InvalidState {
                operation: "resize the grid",
                phase: self.state.phase,
            });
        }
        self.settings.grid_size = grid_size;
        self.state.grid_size = grid_size;
        self.state.player1 = None;
        self.state.player2 = None;
        self.state.target = None;
        debug!("grid size set to {}", grid_size);
        self.notify();
        Ok(())
    }

    pub(crate) fn start(&mut self) -> Result<()> {
        if self.state.phase != GamePhase::Settings {
            return Err(EngineError::InvalidState {
                operation: "start",
                phase: self.state.phase,
            });
        }
        self.begin();
        Ok(())
    }

    /// Restart from a finished (or running) game. Any active cycle is cancelled before the new
    /// one begins, and the intermediate settings phase is never published.
    pub(crate) fn play_again(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            debug!("cancelled {}", cycle.handle());
        }
        self.state.phase = GamePhase::Settings;
        self.begin();
    }

    /// Move a player one cell. Returns whether the move was applied; out of bounds moves, moves
    /// onto the other player and moves outside a running game are ignored.
    pub(crate) fn move_player(&mut self, player: Player, direction: Direction) -> bool {
        if self.state.phase != GamePhase::InProgress {
            debug!(
                "ignoring {} move of {} while the game is {}",
                direction, player, self.state.phase
            );
            return false;
        }
        let (Some(current), Some(other)) = (
            self.state.position(player),
            self.state.position(player.other()),
        ) else {
            return false;
        };
        let Some(candidate) = current.step(&direction, &self.state.grid_size) else {
            debug!("{} cannot move {} from {}: edge of grid", player, direction, current);
            return false;
        };
        if candidate == other {
            debug!("{} cannot move {} onto {}", player, direction, player.other());
            return false;
        }

        *self.state.position_mut(player) = Some(candidate);
        debug!("{} moved {} to {}", player, direction, candidate);
        self.notify();

        if self.state.target == Some(candidate) {
            self.state.phase = GamePhase::Win;
            self.state.winner = Some(player);
            if let Some(cycle) = self.cycle.take() {
                debug!("cancelled {}", cycle.handle());
            }
            info!("{} caught the target at {}", player, candidate);
            self.notify();
        }
        true
    }

    /// Fire every relocation tick whose deadline has passed. Returns the number of ticks fired.
    pub(crate) fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while self.state.phase == GamePhase::InProgress {
            match &self.cycle {
                Some(cycle) if cycle.is_due(now) => (),
                _ => break,
            }
            self.relocate();
            fired += 1;
        }
        fired
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.cycle.as_ref().map(|c| c.next_due())
    }

    pub(crate) fn time_until_next_tick(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|due| due.saturating_duration_since(self.clock.now()))
    }

    pub(crate) fn active_cycle(&self) -> Option<CycleHandle> {
        self.cycle.as_ref().map(|c| c.handle())
    }

    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub(crate) fn grid_size(&self) -> GridSize {
        self.state.grid_size
    }

    pub(crate) fn catch_count(&self) -> u32 {
        self.state.catch_count
    }

    pub(crate) fn target(&self) -> Option<Position> {
        self.state.target
    }

    pub(crate) fn player1(&self) -> Option<Position> {
        self.state.player1
    }

    pub(crate) fn player2(&self) -> Option<Position> {
        self.state.player2
    }

    pub(crate) fn winner(&self) -> Option<Player> {
        self.state.winner
    }
}

// private methods
impl GameEngine {
    fn begin(&mut self) {
        self.state.phase = GamePhase::InProgress;
        self.state.catch_count = 0;
        self.state.winner = None;
        self.state.target = None;

        let player1 = self.random_free_cell(&[]);
        let player2 = self.random_free_cell(&[player1]);
        let target = self.random_free_cell(&[player1, player2]);
        self.state.player1 = Some(player1);
        self.state.player2 = Some(player2);
        self.state.target = Some(target);
        info!(
            "game started on {}: player 1 at {}, player 2 at {}, target at {}",
            self.state.grid_size, player1, player2, target
        );
        self.notify();

        self.cycles_started += 1;
        let cycle = RelocationCycle::new(
            CycleHandle(self.cycles_started),
            self.clock.now(),
            self.settings.relocation_interval,
        );
        debug!("{} due at {:?}", cycle.handle(), cycle.next_due());
        self.cycle = Some(cycle);
    }

    fn relocate(&mut self) {
        let occupied: Vec<Position> = [self.state.target, self.state.player1, self.state.player2]
            .into_iter()
            .flatten()
            .collect();
        let target = self.random_free_cell(&occupied);
        self.state.target = Some(target);
        self.state.catch_count += 1;
        trace!(
            "target jumped to {} ({}/{})",
            target,
            self.state.catch_count,
            self.settings.win_threshold
        );
        self.notify();

        if self.state.catch_count >= self.settings.win_threshold {
            self.state.phase = GamePhase::Lose;
            if let Some(cycle) = self.cycle.take() {
                debug!("cancelled {}", cycle.handle());
            }
            info!("target escaped after {} jumps", self.state.catch_count);
            self.notify();
        } else if let Some(cycle) = self.cycle.as_mut() {
            cycle.advance(self.settings.relocation_interval);
        }
    }

    /// Draw cells until one is not in `occupied`. Column first, then row.
    fn random_free_cell(&mut self, occupied: &[Position]) -> Position {
        let (rows, columns) = (self.state.grid_size.rows(), self.state.grid_size.columns());
        loop {
            let x = self.random.next_int(0, columns);
            let y = self.random.next_int(0, rows);
            let candidate = Position::new(x, y);
            if !occupied.contains(&candidate) {
                return candidate;
            }
            trace!("{} is taken, drawing again", candidate);
        }
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (id, observer) in self.observers.iter_mut() {
            if let Err(e) = observer(state) {
                warn!("subscriber {:?} failed: {:#}", id, e);
            }
        }
    }
}
