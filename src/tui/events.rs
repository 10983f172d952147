use std::time::Duration;

use crate::engine::grid::{Direction, Player};
use crate::error::Result;

pub(crate) trait EventSource {
    /// Wait at most `timeout` for the next event. Returns None if nothing happened in time.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Event {
    UserInput(UserInput),
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum UserInput {
    Start,
    Restart,
    Move(Player, Direction),
    Adjust(Adjustment),
    Quit,
}

/// A nudge to one of the game settings, offered on the settings screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Adjustment {
    WinThreshold(i32),
    IntervalMs(f64),
    Rows(isize),
    Columns(isize),
}
