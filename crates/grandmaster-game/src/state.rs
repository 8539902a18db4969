use shakmaty::Color;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    Starting,
    Ready,
    HumanTurn,
    ComputerTurn,
}

impl GameState {
    pub fn name(self) -> &'static str {
        match self {
            GameState::Starting => "STARTING",
            GameState::Ready => "READY",
            GameState::HumanTurn => "HUMAN_TURN",
            GameState::ComputerTurn => "COMPUTER_TURN",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One robot-executed half move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    /// The robot's own move. The robot always plays black.
    Computer,
    /// White's move, played by the robot while autoplay is on.
    AutoplayHuman,
}

impl Leg {
    pub fn side(self) -> Color {
        match self {
            Leg::Computer => Color::Black,
            Leg::AutoplayHuman => Color::White,
        }
    }
}
