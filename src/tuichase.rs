use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::engine::error::Result as EngineResult;
use crate::engine::game::{GameEngine, GamePhase, SubscriptionId};
use crate::engine::grid::GridSize;
use crate::error::Result;
use crate::tui::events::{Adjustment, Event, EventSource, UserInput};
use crate::tui::renderer::Renderer;

/// How long to wait for input when no target jump is pending.
const IDLE_WAIT: Duration = Duration::from_millis(250);

pub(crate) struct TuiChase<R: Renderer, E: EventSource> {
    engine: GameEngine,
    renderer: R,
    event_source: E,
    dirty: Rc<Cell<bool>>,
    subscription: SubscriptionId,
}

impl<R: Renderer, E: EventSource> TuiChase<R, E> {
    pub(crate) fn new(mut engine: GameEngine, renderer: R, event_source: E) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let subscription = engine.subscribe(move |_| {
            flag.set(true);
            Ok(())
        });
        Self {
            engine,
            renderer,
            event_source,
            dirty,
            subscription,
        }
    }

    /// Run until the player quits, then hand the engine back without the redraw subscription.
    pub(crate) fn run(mut self) -> Result<GameEngine> {
        match self.inner_run() {
            Err(e) => {
                self.renderer.recover();
                Err(e)
            }
            Ok(_) => {
                self.engine.unsubscribe(self.subscription);
                Ok(self.engine)
            }
        }
    }

    /// Drive the game until the player quits: redraw after every published change, wait for
    /// input no longer than the next target jump, then let the engine catch up on due jumps.
    fn inner_run(&mut self) -> Result<()> {
        loop {
            if self.dirty.replace(false) {
                log::trace!(
                    "drawing {} grid: player 1 at {:?}, player 2 at {:?}, target at {:?}",
                    self.engine.grid_size(),
                    self.engine.player1(),
                    self.engine.player2(),
                    self.engine.target(),
                );
                self.renderer
                    .render(self.engine.state(), self.engine.settings())?;
            }

            let timeout = self.engine.time_until_next_tick().unwrap_or(IDLE_WAIT);
            match self.event_source.next_event(timeout)? {
                Some(Event::UserInput(UserInput::Quit)) => break,
                Some(Event::UserInput(input)) => self.handle_input(input)?,
                Some(Event::Resize) => self.dirty.set(true),
                None => (),
            }
            let fired = self.engine.poll();
            if fired > 0 {
                log::trace!("{} jumps fired, {:?} pending", fired, self.engine.active_cycle());
            }
        }
        log::info!(
            "quitting with the game {} after {} jumps",
            self.engine.phase(),
            self.engine.catch_count()
        );
        Ok(())
    }

    /// Start and restart are only forwarded in the phases that offer them, so stray key presses
    /// never reach the engine as invalid calls.
    fn handle_input(&mut self, input: UserInput) -> Result<()> {
        match input {
            UserInput::Start if self.engine.phase() == GamePhase::Settings => self.engine.start()?,
            UserInput::Restart if self.engine.phase().is_terminal() => self.engine.play_again(),
            UserInput::Move(player, direction) => {
                self.engine.move_player(player, direction);
            }
            UserInput::Adjust(adjustment) if self.engine.phase() == GamePhase::Settings => {
                if let Err(e) = self.adjust(adjustment) {
                    log::debug!("rejected {:?}: {}", adjustment, e);
                }
            }
            other => log::debug!("ignoring {:?} while the game is {}", other, self.engine.phase()),
        }
        Ok(())
    }

    fn adjust(&mut self, adjustment: Adjustment) -> EngineResult<()> {
        let settings = self.engine.settings();
        let (rows, columns) = (settings.grid_size.rows(), settings.grid_size.columns());
        match adjustment {
            Adjustment::WinThreshold(delta) => {
                let threshold = settings.win_threshold.saturating_add_signed(delta);
                self.engine.set_win_threshold(threshold)
            }
            Adjustment::IntervalMs(delta) => {
                let ms = settings.relocation_interval.as_millis() as f64 + delta;
                self.engine.set_relocation_interval_ms(ms)
            }
            Adjustment::Rows(delta) => self
                .engine
                .set_grid_size(GridSize::new(rows.saturating_add_signed(delta), columns)?),
            Adjustment::Columns(delta) => self
                .engine
                .set_grid_size(GridSize::new(rows, columns.saturating_add_signed(delta))?),
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::*;

    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::engine::game::{GameState, Settings};
    use crate::engine::grid::{Direction, GridSize, Player, Position};
    use crate::engine::random::{RandomSource, RngSource, SequenceSource};

    const INTERVAL: Duration = Duration::from_millis(100);

    /// Replays scripted events. A `None` entry stands for a wait that timed out, so the clock is
    /// moved forward by the requested timeout. Quits once the script runs out.
    struct ScriptedEvents {
        script: VecDeque<Option<Event>>,
        clock: ManualClock,
    }

    impl EventSource for ScriptedEvents {
        fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
            match self.script.pop_front() {
                Some(None) => {
                    self.clock.advance(timeout);
                    Ok(None)
                }
                Some(event) => Ok(event),
                None => Ok(Some(Event::UserInput(UserInput::Quit))),
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Rc<RefCell<Vec<GameState>>>,
        recovered: Rc<Cell<bool>>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, state: &GameState, _settings: &Settings) -> Result<()> {
            self.frames.borrow_mut().push(state.clone());
            Ok(())
        }

        fn recover(&mut self) {
            self.recovered.set(true);
        }
    }

    fn input(i: UserInput) -> Option<Event> {
        Some(Event::UserInput(i))
    }

    fn run(
        random: impl RandomSource + 'static,
        win_threshold: u32,
        script: Vec<Option<Event>>,
    ) -> (Vec<GameState>, bool) {
        let clock = ManualClock::new();
        let settings = Settings {
            grid_size: GridSize::new(3, 3).expect("valid grid size"),
            relocation_interval: INTERVAL,
            win_threshold,
        };
        let engine = GameEngine::new(random, clock.clone(), settings);
        let renderer = RecordingRenderer::default();
        let frames = Rc::clone(&renderer.frames);
        let recovered = Rc::clone(&renderer.recovered);
        let events = ScriptedEvents {
            script: script.into(),
            clock,
        };
        TuiChase::new(engine, renderer, events)
            .run()
            .expect("scripted run");
        let frames = frames.borrow().clone();
        (frames, recovered.get())
    }

    fn phases(frames: &[GameState]) -> Vec<GamePhase> {
        frames.iter().map(|f| f.phase).collect()
    }

    #[fixture]
    fn seeded() -> RngSource<SmallRng> {
        RngSource::new(SmallRng::seed_from_u64(42))
    }

    #[rstest]
    fn renders_settings_then_quits(seeded: RngSource<SmallRng>) {
        let (frames, recovered) = run(seeded, 10, vec![]);
        assert_eq!(phases(&frames), vec![GamePhase::Settings]);
        assert!(!recovered);
    }

    #[rstest]
    fn start_is_forwarded_once(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Restart),
            input(UserInput::Start),
            input(UserInput::Start),
        ];
        let (frames, _) = run(seeded, 10, script);
        assert_eq!(
            phases(&frames),
            vec![GamePhase::Settings, GamePhase::InProgress]
        );
    }

    #[test]
    fn moves_reach_the_engine() {
        // player 1 at (0,0), player 2 at (2,2), target at (1,0)
        let source = SequenceSource::new(vec![0, 0, 2, 2, 1, 0]);
        let script = vec![
            input(UserInput::Start),
            input(UserInput::Move(Player::Two, Direction::Up)),
            input(UserInput::Move(Player::One, Direction::Right)),
        ];
        let (frames, _) = run(source, 10, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.phase, GamePhase::Win);
        assert_eq!(last.winner, Some(Player::One));
        assert_eq!(last.player2, Some(Position::new(2, 1)));
    }

    #[rstest]
    fn target_escapes_while_waiting(seeded: RngSource<SmallRng>) {
        let script = vec![input(UserInput::Start), None, None];
        let (frames, _) = run(seeded, 2, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.phase, GamePhase::Lose);
        assert_eq!(last.catch_count, 2);
    }

    #[rstest]
    fn restart_after_loss(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Start),
            None,
            input(UserInput::Restart),
        ];
        let (frames, _) = run(seeded, 1, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.phase, GamePhase::InProgress);
        assert_eq!(last.catch_count, 0);
        assert!(phases(&frames).contains(&GamePhase::Lose));
    }

    #[rstest]
    fn run_hands_back_a_detached_engine(seeded: RngSource<SmallRng>) {
        let clock = ManualClock::new();
        let engine = GameEngine::new(seeded, clock.clone(), Settings::default());
        let events = ScriptedEvents {
            script: vec![input(UserInput::Start)].into(),
            clock,
        };
        let mut engine = TuiChase::new(engine, RecordingRenderer::default(), events)
            .run()
            .expect("scripted run");
        assert_eq!(engine.phase(), GamePhase::InProgress);
        assert_eq!(engine.catch_count(), 0);

        let published = Rc::new(Cell::new(0));
        let counter = Rc::clone(&published);
        engine.subscribe(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        engine.play_again();
        assert_eq!(published.get(), 1);
        assert_eq!(engine.phase(), GamePhase::InProgress);
    }

    #[rstest]
    fn resize_redraws(seeded: RngSource<SmallRng>) {
        let (frames, _) = run(seeded, 10, vec![Some(Event::Resize)]);
        assert_eq!(frames.len(), 2);
    }

    #[rstest]
    fn adjusted_threshold_applies(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Adjust(Adjustment::WinThreshold(-9))),
            input(UserInput::Start),
            None,
        ];
        let (frames, _) = run(seeded, 10, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.phase, GamePhase::Lose);
        assert_eq!(last.catch_count, 1);
    }

    #[rstest]
    fn adjusted_grid_size_applies(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Adjust(Adjustment::Columns(2))),
            input(UserInput::Adjust(Adjustment::Rows(-1))),
            input(UserInput::Start),
        ];
        let (frames, _) = run(seeded, 10, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.grid_size, GridSize::new(2, 5).expect("valid grid size"));
        assert_eq!(last.phase, GamePhase::InProgress);
    }

    #[rstest]
    fn invalid_adjustments_are_ignored(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Adjust(Adjustment::Rows(-3))),
            input(UserInput::Adjust(Adjustment::WinThreshold(-10))),
            input(UserInput::Adjust(Adjustment::IntervalMs(-100.0))),
        ];
        let (frames, _) = run(seeded, 10, script);
        assert_eq!(phases(&frames), vec![GamePhase::Settings]);
        assert_eq!(
            frames[0].grid_size,
            GridSize::new(3, 3).expect("valid grid size")
        );
    }

    #[rstest]
    fn adjustments_ignored_mid_game(seeded: RngSource<SmallRng>) {
        let script = vec![
            input(UserInput::Start),
            input(UserInput::Adjust(Adjustment::Columns(1))),
        ];
        let (frames, _) = run(seeded, 10, script);
        let last = frames.last().expect("at least one frame");
        assert_eq!(last.grid_size, GridSize::new(3, 3).expect("valid grid size"));
    }

    struct FailingRenderer {
        recovered: Rc<Cell<bool>>,
    }

    impl Renderer for FailingRenderer {
        fn render(&mut self, _state: &GameState, _settings: &Settings) -> Result<()> {
            Err(anyhow::anyhow!("terminal went away").into())
        }

        fn recover(&mut self) {
            self.recovered.set(true);
        }
    }

    #[rstest]
    fn failure_recovers_terminal(seeded: RngSource<SmallRng>) {
        let clock = ManualClock::new();
        let engine = GameEngine::new(seeded, clock.clone(), Settings::default());
        let recovered = Rc::new(Cell::new(false));
        let renderer = FailingRenderer {
            recovered: Rc::clone(&recovered),
        };
        let events = ScriptedEvents {
            script: VecDeque::new(),
            clock,
        };
        assert!(TuiChase::new(engine, renderer, events).run().is_err());
        assert!(recovered.get());
    }
}
