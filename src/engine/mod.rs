pub(crate) mod clock;
pub(crate) mod cycle;
pub(crate) mod error;
pub(crate) mod game;
pub(crate) mod grid;
pub(crate) mod random;
