//! Bit-packed command and status encoding shared with the controller
//! firmware.
//!
//! Every command is a single integer sent as decimal text followed by `\n`.
//! Every status message is a single byte; zero bytes are line noise.

use crate::DeviceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest file/rank index the gantry accepts. Files 8 and 9 are the
/// graveyard next to the board.
pub const GANTRY_MAX: u8 = 9;

/// Panel buttons. The discriminant is the bit index in the board status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Start = 0,
    Fun = 1,
    Computer = 2,
    Player = 3,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Start, Button::Fun, Button::Computer, Button::Player];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Start => "start",
            Button::Fun => "fun",
            Button::Computer => "computer",
            Button::Player => "player",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown button '{s}'"))
    }
}

/// LED animation programs built into the board firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedPalette {
    Fail = 0,
    Bootup = 1,
    GettingReady = 2,
    Ready = 3,
    HumanTurn = 4,
    AutoplayHumanThink = 5,
    ComputerMove = 6,
    ComputerThink = 7,
}

impl LedPalette {
    pub const ALL: [LedPalette; 8] = [
        LedPalette::Fail,
        LedPalette::Bootup,
        LedPalette::GettingReady,
        LedPalette::Ready,
        LedPalette::HumanTurn,
        LedPalette::AutoplayHumanThink,
        LedPalette::ComputerMove,
        LedPalette::ComputerThink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LedPalette::Fail => "fail",
            LedPalette::Bootup => "bootup",
            LedPalette::GettingReady => "getting_ready",
            LedPalette::Ready => "ready",
            LedPalette::HumanTurn => "human_turn",
            LedPalette::AutoplayHumanThink => "autoplay_human_think",
            LedPalette::ComputerMove => "computer_move",
            LedPalette::ComputerThink => "computer_think",
        }
    }
}

impl fmt::Display for LedPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LedPalette {
    type Err = String;

    /// Accepts the palette name (any case, `-` or `_`) or its number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<usize>() {
            return LedPalette::ALL
                .get(n)
                .copied()
                .ok_or_else(|| format!("no palette number {n}"));
        }
        let wanted = s.replace('-', "_");
        LedPalette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown palette '{s}'"))
    }
}

/// Gantry position in board coordinates. `(-1, -1)` is what an all-zero
/// nibble pair decodes to and never a reachable square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GantryPosition {
    pub file: i8,
    pub rank: i8,
}

impl GantryPosition {
    pub fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    /// True if this is where a `move_gantry(file, rank)` ends up.
    pub fn is_at(&self, file: u8, rank: u8) -> bool {
        i16::from(self.file) == i16::from(file) && i16::from(self.rank) == i16::from(rank)
    }
}

impl fmt::Display for GantryPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file, self.rank)
    }
}

/// Gantry move command: `((file + 1) << 4) | (rank + 1)`.
pub fn encode_gantry(file: u8, rank: u8) -> Result<u32, DeviceError> {
    if file > GANTRY_MAX || rank > GANTRY_MAX {
        return Err(DeviceError::InvalidPosition { file, rank });
    }
    Ok(((u32::from(file) + 1) << 4) | (u32::from(rank) + 1))
}

/// Gantry status byte to position.
pub fn decode_gantry(byte: u8) -> GantryPosition {
    GantryPosition {
        file: (byte >> 4) as i8 - 1,
        rank: (byte & 0x0F) as i8 - 1,
    }
}

/// Commands understood by the board controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardCommand {
    Electromagnet(bool),
    ButtonLight { button: Button, enabled: bool },
    Palette(LedPalette),
}

impl BoardCommand {
    /// The two low bits select the command.
    pub fn encode(self) -> u32 {
        match self {
            BoardCommand::Electromagnet(true) => 0b110,
            BoardCommand::Electromagnet(false) => 0b010,
            BoardCommand::ButtonLight { button, enabled } => {
                (u32::from(enabled) << 4) | ((button as u32) << 2) | 0b01
            }
            BoardCommand::Palette(palette) => ((palette as u32) << 2) | 0b11,
        }
    }
}

/// One board status byte: bits 0-3 are the buttons, bit 4 the electromagnet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardStatus(pub u8);

impl BoardStatus {
    pub const MAGNET_BIT: u8 = 1 << 4;

    #[inline]
    pub fn pressed(self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    #[inline]
    pub fn electromagnet(self) -> bool {
        self.0 & Self::MAGNET_BIT != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gantry_encoding() {
        assert_eq!(encode_gantry(3, 5).expect("in range"), 70);
        assert_eq!(encode_gantry(0, 0).expect("in range"), 0x11);
        assert_eq!(encode_gantry(9, 9).expect("in range"), 0xAA);
        assert!(matches!(
            encode_gantry(10, 0),
            Err(DeviceError::InvalidPosition { file: 10, rank: 0 })
        ));
        assert!(encode_gantry(0, 10).is_err());
    }

    #[test]
    fn gantry_decoding() {
        assert_eq!(decode_gantry(70), GantryPosition::new(3, 5));
        assert_eq!(decode_gantry(0x11), GantryPosition::new(0, 0));
        for file in 0..=GANTRY_MAX {
            for rank in 0..=GANTRY_MAX {
                let byte = encode_gantry(file, rank).expect("in range") as u8;
                assert!(decode_gantry(byte).is_at(file, rank));
            }
        }
    }

    #[test]
    fn board_commands() {
        assert_eq!(BoardCommand::Electromagnet(true).encode(), 0b110);
        assert_eq!(BoardCommand::Electromagnet(false).encode(), 0b010);
        assert_eq!(
            BoardCommand::ButtonLight {
                button: Button::Player,
                enabled: true
            }
            .encode(),
            0b1_11_01
        );
        assert_eq!(
            BoardCommand::ButtonLight {
                button: Button::Start,
                enabled: false
            }
            .encode(),
            0b0_00_01
        );
        assert_eq!(BoardCommand::Palette(LedPalette::ComputerThink).encode(), 0b111_11);
        assert_eq!(BoardCommand::Palette(LedPalette::Fail).encode(), 0b11);
    }

    #[test]
    fn board_status_bits() {
        let status = BoardStatus(0b1_0100);
        assert!(status.electromagnet());
        assert!(status.pressed(Button::Computer));
        assert!(!status.pressed(Button::Start));
        assert!(!BoardStatus(0b1000_0000).electromagnet());
    }

    #[test]
    fn parse_names() {
        assert_eq!("PLAYER".parse::<Button>(), Ok(Button::Player));
        assert!("pause".parse::<Button>().is_err());
        assert_eq!("human-turn".parse::<LedPalette>(), Ok(LedPalette::HumanTurn));
        assert_eq!("7".parse::<LedPalette>(), Ok(LedPalette::ComputerThink));
        assert!("8".parse::<LedPalette>().is_err());
    }
}
