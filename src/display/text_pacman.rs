use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

use super::GameDisplay;
use crate::{pacman::GameState, turn_game::TurnState};

/// Prints one line per pacman turn and redraws the board every
/// `draw_every` turns and on the final frame.
pub struct TextPacmanDisplay<W: Write = io::Stdout> {
    out: W,
    frame_time: Duration,
    draw_every: usize,
    turn: usize,
}

impl TextPacmanDisplay {
    /// Display writing to stdout, waiting `frame_time` after each drawing.
    pub fn new(frame_time: Duration) -> Self {
        Self::with_writer(io::stdout(), frame_time)
    }
}

impl<W: Write> TextPacmanDisplay<W> {
    /// Display writing to `out`.
    pub fn with_writer(out: W, frame_time: Duration) -> Self {
        TextPacmanDisplay {
            out,
            frame_time,
            draw_every: 1,
            turn: 0,
        }
    }

    /// Redraw the board every `turns` pacman turns (at least 1).
    pub fn with_draw_every(mut self, turns: usize) -> Self {
        self.draw_every = turns.max(1);
        self
    }

    /// Give the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, state: &GameState) -> io::Result<()> {
        write!(self.out, "{state}")?;
        self.out.flush()?;
        if !self.frame_time.is_zero() {
            thread::sleep(self.frame_time);
        }
        Ok(())
    }
}

impl<W: Write> GameDisplay<GameState> for TextPacmanDisplay<W> {
    fn initialize(&mut self, state: &GameState) -> io::Result<()> {
        self.turn = 0;
        self.draw(state)
    }

    fn update(&mut self, state: &GameState) -> io::Result<()> {
        let terminal = state.is_win() || state.is_lose();
        let mut drawn = false;
        if state.agent_moved() == Some(0) {
            self.turn += 1;
            writeln!(
                self.out,
                "{:4}) P: {:<8} | Score: {:<5}",
                self.turn,
                state.pacman_position().to_string(),
                state.points()
            )?;
            if self.turn % self.draw_every == 0 {
                self.draw(state)?;
                drawn = true;
            }
        }
        if terminal && !drawn {
            self.draw(state)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacman::{Direction, Layout};

    #[test]
    fn test_turn_lines_and_board() {
        let state = GameState::initial(&Layout::by_name("openLine").unwrap(), 1);
        let mut display = TextPacmanDisplay::with_writer(Vec::new(), Duration::ZERO).with_draw_every(2);
        display.initialize(&state).unwrap();

        let state = state.generate_successor(0, &Direction::East).unwrap();
        display.update(&state).unwrap();
        let state = state.generate_successor(1, &Direction::West).unwrap();
        display.update(&state).unwrap();
        display.finish().unwrap();

        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "%%%%%%%%%");
        assert_eq!(lines[3], "Score: 0");
        assert!(lines[4].starts_with("   1) P: (2, 1)"));
        assert!(lines[4].contains("Score: 9"));
        assert_eq!(lines.len(), 5);
    }
}
