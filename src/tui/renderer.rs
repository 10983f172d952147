use crate::engine::game::{GameState, Settings};
use crate::error::Result;

pub(crate) trait Renderer {
    fn render(&mut self, state: &GameState, settings: &Settings) -> Result<()>;

    /// Give the terminal back to the user. Called when the game loop fails.
    fn recover(&mut self);
}
