use boxy::{Char, Weight};
use textwrap::wrap;

use crate::engine::game::{GamePhase, GameState, Settings};
use crate::engine::grid::Position;

use super::colors::{Colors, Rgb};

/// Each grid cell is drawn three columns wide so the board looks roughly square.
const CELL_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Span {
    pub(crate) text: String,
    pub(crate) color: Option<Rgb>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Line {
    pub(crate) spans: Vec<Span>,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        let mut line = Line::default();
        line.push(text, None);
        line
    }

    fn push(&mut self, text: impl Into<String>, color: Option<Rgb>) {
        self.spans.push(Span {
            text: text.into(),
            color,
        });
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Lay out the screen for the given snapshot: the settings screen before the first game, the
/// board while playing, and the board with a result message once the game is over.
pub(crate) fn layout(
    state: &GameState,
    settings: &Settings,
    colors: &Colors,
    width: usize,
) -> Vec<Line> {
    let mut lines = vec![Line::plain("tuichase"), Line::default()];
    match state.phase {
        GamePhase::Settings => {
            paragraph(
                &mut lines,
                &format!(
                    "Grid: {}. The target jumps every {} ms; catch it before it has jumped {} times.",
                    settings.grid_size,
                    settings.relocation_interval.as_millis(),
                    settings.win_threshold,
                ),
                width,
            );
            lines.push(Line::default());
            paragraph(
                &mut lines,
                "Player 1 moves with the arrow keys or hjkl, player 2 with wasd.",
                width,
            );
            paragraph(
                &mut lines,
                "Adjust with +/- for jumps, </> for the interval, [/] for columns and {/} for rows.",
                width,
            );
            lines.push(Line::default());
            paragraph(&mut lines, "Press Enter to start, q to quit.", width);
        }
        GamePhase::InProgress => {
            lines.push(jumps(state, settings));
            lines.push(Line::default());
            board(&mut lines, state, colors);
        }
        GamePhase::Win | GamePhase::Lose => {
            lines.push(jumps(state, settings));
            lines.push(Line::default());
            board(&mut lines, state, colors);
            lines.push(Line::default());
            let result = match state.winner {
                Some(player) if state.phase == GamePhase::Win => format!(
                    "Player {} caught the target after {} jumps!",
                    player.number(),
                    state.catch_count
                ),
                _ => format!("The target got away after {} jumps.", state.catch_count),
            };
            paragraph(&mut lines, &result, width);
            paragraph(&mut lines, "Press r to play again, q to quit.", width);
        }
    }
    lines
}

fn paragraph(lines: &mut Vec<Line>, text: &str, width: usize) {
    for l in wrap(text, width.max(1)) {
        lines.push(Line::plain(l.to_string()));
    }
}

fn jumps(state: &GameState, settings: &Settings) -> Line {
    Line::plain(format!(
        "Jumps: {}/{}",
        state.catch_count, settings.win_threshold
    ))
}

fn board(lines: &mut Vec<Line>, state: &GameState, colors: &Colors) {
    let corner = Char::upper_left(Weight::Doubled);
    let horizontal: char = Char::horizontal(Weight::Doubled).into();
    let vertical: char = Char::vertical(Weight::Doubled).into();
    let border = Some(colors.border);

    let bar: String = std::iter::repeat(horizontal)
        .take(state.grid_size.columns() * CELL_WIDTH)
        .collect();
    let top_left: char = corner.clone().into();
    let top_right: char = corner.clone().rotate_cw(1).into();
    let bottom_right: char = corner.clone().rotate_cw(2).into();
    let bottom_left: char = corner.clone().rotate_ccw(1).into();

    let mut top = Line::default();
    top.push(format!("{top_left}{bar}{top_right}"), border);
    lines.push(top);

    for y in 0..state.grid_size.rows() {
        let mut row = Line::default();
        row.push(vertical, border);
        for x in 0..state.grid_size.columns() {
            let (text, color) = cell(state, Position::new(x, y), colors);
            row.push(text, color);
        }
        row.push(vertical, border);
        lines.push(row);
    }

    let mut bottom = Line::default();
    bottom.push(format!("{bottom_left}{bar}{bottom_right}"), border);
    lines.push(bottom);
}

fn cell(state: &GameState, pos: Position, colors: &Colors) -> (&'static str, Option<Rgb>) {
    let here = Some(pos);
    if state.player1 == here {
        (" 1 ", Some(colors.player1))
    } else if state.player2 == here {
        (" 2 ", Some(colors.player2))
    } else if state.target == here {
        (" G ", Some(colors.target))
    } else {
        (" · ", None)
    }
}
