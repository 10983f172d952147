use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event as CrossTermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style, terminal, ExecutableCommand, QueueableCommand,
};

use crate::engine::game::{GameState, Settings};
use crate::engine::grid::{Direction, Player};
use crate::error::Result;
use crate::tui::colors::Colors;
use crate::tui::events::{Adjustment, Event, EventSource, UserInput};
use crate::tui::renderer::Renderer;
use crate::tui::view;

pub(crate) struct Crossterm<T: Write> {
    w: Box<T>,
    colors: Colors,
    active: bool,
}

impl<T: Write> Crossterm<T> {
    pub(crate) fn new(mut w: Box<T>) -> Result<Self> {
        terminal::enable_raw_mode()?;
        w.execute(terminal::EnterAlternateScreen)?;
        w.execute(cursor::Hide)?;
        Ok(Self {
            w,
            colors: Colors::default(),
            active: true,
        })
    }

    fn restore(&mut self) -> std::io::Result<()> {
        self.w.execute(cursor::Show)?;
        self.w.execute(terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl<T: Write> Drop for Crossterm<T> {
    fn drop(&mut self) {
        self.recover();
    }
}

impl<T: Write> Renderer for Crossterm<T> {
    fn render(&mut self, state: &GameState, settings: &Settings) -> Result<()> {
        let (width, height) = terminal::size()?;
        let lines = view::layout(state, settings, &self.colors, width as usize);

        self.w.queue(terminal::BeginSynchronizedUpdate)?;
        self.w.queue(terminal::Clear(terminal::ClearType::All))?;
        for (y, line) in lines.iter().take(height as usize).enumerate() {
            self.w.queue(cursor::MoveTo(0, y as u16))?;
            for span in &line.spans {
                if let Some(color) = span.color {
                    self.w.queue(style::SetForegroundColor(color.into()))?;
                }
                self.w.queue(style::Print(&span.text))?;
                self.w.queue(style::ResetColor)?;
            }
        }
        self.w.queue(terminal::EndSynchronizedUpdate)?;
        self.w.flush()?;
        Ok(())
    }

    fn recover(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.restore() {
            log::warn!("failed to restore terminal: {}", e);
        }
    }
}

#[derive(Default)]
pub(crate) struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            CrossTermEvent::Key(ke) => handle_key_event(ke).map(Event::UserInput),
            CrossTermEvent::Resize(_, _) => Some(Event::Resize),
            _ => None,
        };
        Ok(event)
    }
}

const INTERVAL_STEP_MS: f64 = 100.0;

fn handle_key_event(ke: KeyEvent) -> Option<UserInput> {
    if ke.kind == KeyEventKind::Release {
        return None;
    }
    if ke.modifiers.contains(KeyModifiers::CONTROL) && ke.code == KeyCode::Char('c') {
        return Some(UserInput::Quit);
    }
    let one = |d| Some(UserInput::Move(Player::One, d));
    let two = |d| Some(UserInput::Move(Player::Two, d));
    let adjust = |a| Some(UserInput::Adjust(a));
    match ke.code {
        KeyCode::Left | KeyCode::Char('h') => one(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => one(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => one(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => one(Direction::Down),
        KeyCode::Char('a') => two(Direction::Left),
        KeyCode::Char('d') => two(Direction::Right),
        KeyCode::Char('w') => two(Direction::Up),
        KeyCode::Char('s') => two(Direction::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Some(UserInput::Start),
        KeyCode::Char('r') => Some(UserInput::Restart),
        KeyCode::Char('+') | KeyCode::Char('=') => adjust(Adjustment::WinThreshold(1)),
        KeyCode::Char('-') => adjust(Adjustment::WinThreshold(-1)),
        KeyCode::Char('>') | KeyCode::Char('.') => adjust(Adjustment::IntervalMs(INTERVAL_STEP_MS)),
        KeyCode::Char('<') | KeyCode::Char(',') => adjust(Adjustment::IntervalMs(-INTERVAL_STEP_MS)),
        KeyCode::Char(']') => adjust(Adjustment::Columns(1)),
        KeyCode::Char('[') => adjust(Adjustment::Columns(-1)),
        KeyCode::Char('}') => adjust(Adjustment::Rows(1)),
        KeyCode::Char('{') => adjust(Adjustment::Rows(-1)),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserInput::Quit),
        _ => None,
    }
}
