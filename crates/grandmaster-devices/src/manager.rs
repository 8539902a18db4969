//! Device manager owning both controllers.

use crate::discovery::{list_ports, locate};
use crate::link::{Controller, Link, SerialLink};
use crate::protocol::{
    decode_gantry, encode_gantry, BoardCommand, BoardStatus, Button, GantryPosition, LedPalette,
};
use crate::{DeviceConfig, DeviceError};
use grandmaster_core::SharedSink;
use std::fmt;
use std::time::{Duration, Instant};

pub type ButtonHandler = Box<dyn FnMut() + Send>;
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Button → handler mapping, fixed before the manager is built.
#[derive(Default)]
pub struct ButtonHandlers {
    handlers: [Option<ButtonHandler>; 4],
}

impl ButtonHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for presses of `button`.
    ///
    /// A second handler for the same button is rejected.
    pub fn with(
        mut self,
        button: Button,
        handler: impl FnMut() + Send + 'static,
    ) -> Result<Self, DeviceError> {
        let slot = &mut self.handlers[button.index()];
        if slot.is_some() {
            return Err(DeviceError::DuplicateHandler(button));
        }
        *slot = Some(Box::new(handler));
        Ok(self)
    }

    pub fn contains(&self, button: Button) -> bool {
        self.handlers[button.index()].is_some()
    }

    fn dispatch(&mut self, button: Button) {
        if let Some(handler) = self.handlers[button.index()].as_mut() {
            handler();
        }
    }
}

impl fmt::Debug for ButtonHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<_> = Button::ALL.into_iter().filter(|b| self.contains(*b)).collect();
        f.debug_struct("ButtonHandlers")
            .field("registered", &registered)
            .finish()
    }
}

/// Last observed controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub ready: bool,
    pub gantry: GantryPosition,
    pub electromagnet: bool,
    pub buttons: [bool; 4],
}

impl DeviceState {
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }

    /// `Gantry: (x, y) / Magnet: ON|OFF`
    pub fn summary(&self) -> String {
        format!(
            "Gantry: {} / Magnet: {}",
            self.gantry,
            if self.electromagnet { "ON" } else { "OFF" }
        )
    }
}

/// Talks to the gantry and board controllers.
///
/// All state changes happen inside [`poll`](Self::poll), which the commands
/// call while waiting for confirmation. Button handlers run synchronously
/// from `poll`, one status byte at a time.
pub struct DeviceManager<L: Link> {
    gantry: Controller<L>,
    board: Controller<L>,
    state: DeviceState,
    handlers: ButtonHandlers,
    on_ready: Option<ReadyCallback>,
    warmup_until: Instant,
    wait_timeout: Option<Duration>,
    heard_gantry: bool,
    heard_board: bool,
    sink: SharedSink,
}

impl DeviceManager<SerialLink> {
    /// Locate both Arduinos by USB serial number and open them.
    pub fn connect(
        config: &DeviceConfig,
        handlers: ButtonHandlers,
        sink: SharedSink,
    ) -> Result<Self, DeviceError> {
        let ports = list_ports()?;
        let gantry_port = locate(&ports, "gantry", &config.gantry_serial)?;
        let board_port = locate(&ports, "board", &config.board_serial)?;
        let gantry = SerialLink::open(&gantry_port.path, config.baud_rate)?;
        let board = SerialLink::open(&board_port.path, config.baud_rate)?;
        Ok(Self::with_links(gantry, board, config, handlers, sink))
    }
}

impl<L: Link> DeviceManager<L> {
    /// Wrap already-open links. The warm-up period starts now.
    pub fn with_links(
        gantry: L,
        board: L,
        config: &DeviceConfig,
        handlers: ButtonHandlers,
        sink: SharedSink,
    ) -> Self {
        Self {
            gantry: Controller::new("gantry", gantry),
            board: Controller::new("board", board),
            state: DeviceState::default(),
            handlers,
            on_ready: None,
            warmup_until: Instant::now() + config.warmup(),
            wait_timeout: config.wait_timeout(),
            heard_gantry: false,
            heard_board: false,
            sink,
        }
    }

    /// Called once, from `poll`, when both controllers are up.
    pub fn set_ready_callback(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_ready = Some(Box::new(callback));
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.ready
    }

    pub fn gantry_link(&self) -> &L {
        self.gantry.link()
    }

    pub fn board_link(&self) -> &L {
        self.board.link()
    }

    /// Read and apply everything both controllers sent since the last poll.
    pub fn poll(&mut self) -> Result<(), DeviceError> {
        let board_bytes = self.board.read_status()?;
        let gantry_bytes = self.gantry.read_status()?;
        if Instant::now() < self.warmup_until {
            return Ok(());
        }

        for byte in board_bytes {
            self.heard_board = true;
            self.apply_board_status(BoardStatus(byte));
        }
        if let Some(&last) = gantry_bytes.last() {
            self.heard_gantry = true;
            self.state.gantry = decode_gantry(last);
        }

        if !self.state.ready && self.heard_board && self.heard_gantry {
            self.state.ready = true;
            log::info!("both controllers reporting");
            self.sink.emit("Devices ready");
            if let Some(callback) = self.on_ready.take() {
                callback();
            }
        }
        Ok(())
    }

    fn apply_board_status(&mut self, status: BoardStatus) {
        for button in Button::ALL {
            let pressed = status.pressed(button);
            let was_pressed = std::mem::replace(&mut self.state.buttons[button.index()], pressed);
            if pressed && !was_pressed {
                log::debug!("button {button} pressed");
                self.handlers.dispatch(button);
            }
        }
        self.state.electromagnet = status.electromagnet();
    }

    /// Poll until `done` holds for the observed state.
    ///
    /// Without a configured timeout this waits forever.
    pub fn wait_until(
        &mut self,
        what: &'static str,
        done: impl Fn(&DeviceState) -> bool,
    ) -> Result<(), DeviceError> {
        let started = Instant::now();
        while !done(&self.state) {
            if let Some(limit) = self.wait_timeout {
                if started.elapsed() >= limit {
                    return Err(DeviceError::WaitTimeout { what, after: limit });
                }
            }
            self.poll()?;
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), DeviceError> {
        if self.state.ready {
            Ok(())
        } else {
            Err(DeviceError::NotReady)
        }
    }

    /// Move the gantry head over `(file, rank)`. Files 8-9 are the graveyard.
    pub fn move_gantry(&mut self, file: u8, rank: u8, block: bool) -> Result<(), DeviceError> {
        self.ensure_ready()?;
        let command = encode_gantry(file, rank)?;
        log::debug!("moving gantry to ({file}, {rank})");
        self.gantry.write_command(command)?;
        if block {
            self.wait_until("gantry move", |s| s.gantry.is_at(file, rank))?;
        }
        Ok(())
    }

    pub fn set_electromagnet(&mut self, enabled: bool, block: bool) -> Result<(), DeviceError> {
        self.ensure_ready()?;
        self.board
            .write_command(BoardCommand::Electromagnet(enabled).encode())?;
        if block {
            self.wait_until("electromagnet", |s| s.electromagnet == enabled)?;
        }
        Ok(())
    }

    /// Light or darken one button. With `others`, every other button is set
    /// to that value afterwards.
    pub fn set_button_light(
        &mut self,
        button: Button,
        enabled: bool,
        others: Option<bool>,
    ) -> Result<(), DeviceError> {
        self.ensure_ready()?;
        self.board
            .write_command(BoardCommand::ButtonLight { button, enabled }.encode())?;
        if let Some(others) = others {
            for other in Button::ALL.into_iter().filter(|b| *b != button) {
                self.board.write_command(
                    BoardCommand::ButtonLight {
                        button: other,
                        enabled: others,
                    }
                    .encode(),
                )?;
            }
        }
        Ok(())
    }

    pub fn set_led_palette(&mut self, palette: LedPalette) -> Result<(), DeviceError> {
        self.ensure_ready()?;
        log::debug!("led palette {palette}");
        self.board
            .write_command(BoardCommand::Palette(palette).encode())
    }
}

impl<L: Link> fmt::Debug for DeviceManager<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceManager")
            .field("state", &self.state)
            .field("handlers", &self.handlers)
            .field("wait_timeout", &self.wait_timeout)
            .finish_non_exhaustive()
    }
}
