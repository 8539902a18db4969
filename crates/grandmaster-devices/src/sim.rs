//! In-process stand-in for the two Arduinos.
//!
//! The simulated firmware reports the gantry position and the board status
//! on every read, moves and switches the magnet instantly, and records every
//! command it receives. A [`SimHandle`] shared with the links presses
//! buttons and injects faults.

use crate::link::Link;
use crate::protocol::{decode_gantry, Button, GantryPosition, LedPalette};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Bit 7 keeps an idle board status byte non-zero.
const BOARD_ALIVE: u8 = 0x80;

#[derive(Debug, Default)]
struct Bench {
    gantry: GantryPosition,
    magnet: bool,
    lights: [bool; 4],
    palette: Option<LedPalette>,
    board_events: VecDeque<u8>,
    gantry_log: Vec<u32>,
    board_log: Vec<u32>,
    failing_writes: usize,
    frozen: bool,
    silent: bool,
}

impl Bench {
    fn board_status(&self, held: u8) -> u8 {
        BOARD_ALIVE | (u8::from(self.magnet) << 4) | held
    }

    fn gantry_status(&self) -> u8 {
        (((self.gantry.file + 1) as u8) << 4) | ((self.gantry.rank + 1) as u8)
    }

    fn apply_board(&mut self, command: u32) {
        match command & 0b11 {
            0b10 => {
                if !self.frozen {
                    self.magnet = command & 0b100 != 0;
                }
            }
            0b01 => {
                let button = ((command >> 2) & 0b11) as usize;
                self.lights[button] = command & 0b1_0000 != 0;
            }
            0b11 => self.palette = LedPalette::ALL.get((command >> 2) as usize).copied(),
            _ => log::warn!("sim board: ignoring command {command}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Gantry,
    Board,
}

/// One simulated controller connection.
#[derive(Debug)]
pub struct SimLink {
    role: Role,
    bench: Arc<Mutex<Bench>>,
    line: Vec<u8>,
}

/// Control and inspection side of a simulated bench.
#[derive(Clone, Debug)]
pub struct SimHandle {
    bench: Arc<Mutex<Bench>>,
}

/// Gantry link, board link and the handle driving both.
pub fn sim_pair() -> (SimLink, SimLink, SimHandle) {
    let bench = Arc::new(Mutex::new(Bench::default()));
    let link = |role| SimLink {
        role,
        bench: Arc::clone(&bench),
        line: Vec::new(),
    };
    (
        link(Role::Gantry),
        link(Role::Board),
        SimHandle {
            bench: Arc::clone(&bench),
        },
    )
}

fn lock(bench: &Mutex<Bench>) -> MutexGuard<'_, Bench> {
    bench.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimLink {
    fn handle_line(&mut self, line: &str) -> io::Result<()> {
        let command: u32 = line.trim().parse().map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, format!("bad command '{line}'"))
        })?;
        let mut bench = lock(&self.bench);
        match self.role {
            Role::Gantry => {
                bench.gantry_log.push(command);
                if !bench.frozen {
                    bench.gantry = decode_gantry((command & 0xFF) as u8);
                }
            }
            Role::Board => {
                bench.board_log.push(command);
                bench.apply_board(command);
            }
        }
        Ok(())
    }
}

impl Link for SimLink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        {
            let mut bench = lock(&self.bench);
            if bench.failing_writes > 0 {
                bench.failing_writes -= 1;
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "simulated write failure",
                ));
            }
        }
        for &b in bytes {
            if b == b'\n' {
                let line = String::from_utf8_lossy(&self.line).into_owned();
                self.line.clear();
                self.handle_line(&line)?;
            } else {
                self.line.push(b);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut bench = lock(&self.bench);
        if bench.silent {
            return Ok(Vec::new());
        }
        Ok(match self.role {
            Role::Gantry => vec![0, bench.gantry_status()],
            Role::Board => {
                let mut out: Vec<u8> = bench.board_events.drain(..).collect();
                out.push(bench.board_status(0));
                out
            }
        })
    }
}

impl SimHandle {
    /// Press and release `button` on the next board read.
    pub fn press(&self, button: Button) {
        let mut bench = lock(&self.bench);
        let down = bench.board_status(1 << button.index());
        let up = bench.board_status(0);
        bench.board_events.push_back(down);
        bench.board_events.push_back(up);
    }

    /// Make the next `count` writes on either link fail.
    pub fn fail_next_writes(&self, count: usize) {
        lock(&self.bench).failing_writes = count;
    }

    /// While frozen, commands are recorded but never take effect.
    pub fn set_frozen(&self, frozen: bool) {
        lock(&self.bench).frozen = frozen;
    }

    /// While silent, neither controller sends status bytes.
    pub fn set_silent(&self, silent: bool) {
        lock(&self.bench).silent = silent;
    }

    pub fn gantry(&self) -> GantryPosition {
        lock(&self.bench).gantry
    }

    pub fn magnet(&self) -> bool {
        lock(&self.bench).magnet
    }

    pub fn light(&self, button: Button) -> bool {
        lock(&self.bench).lights[button.index()]
    }

    pub fn palette(&self) -> Option<LedPalette> {
        lock(&self.bench).palette
    }

    /// Every command the gantry received, in order.
    pub fn gantry_writes(&self) -> Vec<u32> {
        lock(&self.bench).gantry_log.clone()
    }

    /// Every command the board received, in order.
    pub fn board_writes(&self) -> Vec<u32> {
        lock(&self.bench).board_log.clone()
    }

    pub fn clear_writes(&self) {
        let mut bench = lock(&self.bench);
        bench.gantry_log.clear();
        bench.board_log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gantry_echoes_position() {
        let (mut gantry, _, handle) = sim_pair();
        assert_eq!(gantry.read_available().expect("read"), vec![0, 0x11]);
        gantry.write_bytes(b"70\n").expect("write");
        assert_eq!(handle.gantry(), GantryPosition::new(3, 5));
        assert_eq!(gantry.read_available().expect("read"), vec![0, 70]);
    }

    #[test]
    fn board_applies_commands() {
        let (_, mut board, handle) = sim_pair();
        board.write_bytes(b"6\n29\n31\n").expect("write");
        assert!(handle.magnet());
        assert!(handle.light(Button::Player));
        assert_eq!(handle.palette(), Some(LedPalette::ComputerThink));
        assert_eq!(handle.board_writes(), vec![6, 29, 31]);
        assert_eq!(board.read_available().expect("read"), vec![0x90]);
    }

    #[test]
    fn press_is_down_then_up() {
        let (_, mut board, handle) = sim_pair();
        handle.press(Button::Fun);
        assert_eq!(
            board.read_available().expect("read"),
            vec![0x82, 0x80, 0x80]
        );
    }

    #[test]
    fn injected_failures_run_out() {
        let (mut gantry, _, handle) = sim_pair();
        handle.fail_next_writes(1);
        assert!(gantry.write_bytes(b"17\n").is_err());
        assert!(gantry.write_bytes(b"17\n").is_ok());
        assert_eq!(handle.gantry_writes(), vec![17]);
    }
}
