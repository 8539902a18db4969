//! The game loop.
//!
//! One thread owns everything: each [`Orchestrator::step`] polls the
//! controllers, handles queued inputs and runs at most one scheduled turn
//! leg. Button handlers and the device-ready callback only enqueue, so no
//! handler ever re-enters the orchestrator.

use crate::input::ControlInput;
use crate::source::{fetch_with_retry, ImageSource};
use crate::state::{GameState, Leg};
use crate::{pick_move, GameConfig, TurnError};
use grandmaster_core::SharedSink;
use grandmaster_devices::{Button, DeviceError, DeviceManager, LedPalette, Link};
use grandmaster_vision::{generate_board, save_annotated, BoardDetector, DetectError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shakmaty::{CastlingMode, Color, Square};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::thread;

pub struct Orchestrator<L: Link, S: ImageSource> {
    devices: DeviceManager<L>,
    detector: BoardDetector,
    source: S,
    inputs: Receiver<ControlInput>,
    backlog: VecDeque<ControlInput>,
    state: GameState,
    autoplay: bool,
    pending: Option<Leg>,
    failures: u32,
    running: bool,
    rng: StdRng,
    config: GameConfig,
    sink: SharedSink,
}

impl<L: Link, S: ImageSource> Orchestrator<L, S> {
    pub fn new(
        devices: DeviceManager<L>,
        detector: BoardDetector,
        source: S,
        inputs: Receiver<ControlInput>,
        config: GameConfig,
        sink: SharedSink,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            devices,
            detector,
            source,
            inputs,
            backlog: VecDeque::new(),
            state: GameState::Starting,
            autoplay: false,
            pending: None,
            failures: 0,
            running: true,
            rng,
            config,
            sink,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Leg that the next [`step`](Self::step) will run.
    pub fn pending_leg(&self) -> Option<Leg> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn devices(&self) -> &DeviceManager<L> {
        &self.devices
    }

    /// `State: <state> / Gantry: (x, y) / Magnet: ON|OFF`
    pub fn status_line(&self) -> String {
        format!("State: {} / {}", self.state, self.devices.state().summary())
    }

    /// Step until a quit command arrives.
    pub fn run(&mut self) {
        log::info!("game loop started");
        while self.running {
            self.step();
            if self.pending.is_none() {
                thread::sleep(self.config.poll_interval());
            }
        }
        log::info!("game loop stopped");
    }

    /// One loop iteration.
    pub fn step(&mut self) {
        if let Err(err) = self.devices.poll() {
            log::warn!("device poll failed: {err}");
            self.sink.emit(&format!("Device error: {err}"));
        }

        while let Some(input) = self.next_input() {
            self.handle(input);
            if !self.running {
                return;
            }
        }

        if let Some(leg) = self.pending.take() {
            self.run_leg(leg);
        }
    }

    fn next_input(&mut self) -> Option<ControlInput> {
        self.backlog
            .pop_front()
            .or_else(|| self.inputs.try_recv().ok())
    }

    pub fn handle(&mut self, input: ControlInput) {
        log::debug!("input {input:?} in {}", self.state);
        let result = match input {
            ControlInput::DevicesReady => self.on_devices_ready(),
            ControlInput::Start => self.start(),
            ControlInput::Play => {
                self.trigger_play();
                Ok(())
            }
            ControlInput::Autoplay(enabled) => self.set_autoplay(enabled),
            ControlInput::MoveTo(square) => {
                self.sink.emit(&format!("Moving to square: {square}"));
                self.move_to_square(square, false)
            }
            ControlInput::Magnet(enabled) => {
                self.sink.emit(&format!(
                    "Turning magnet {}",
                    if enabled { "ON" } else { "OFF" }
                ));
                self.devices.set_electromagnet(enabled, false)
            }
            ControlInput::ButtonLight { button, enabled } => {
                self.sink.emit(&format!(
                    "Turning button light {button} {}",
                    if enabled { "ON" } else { "OFF" }
                ));
                self.devices.set_button_light(button, enabled, None)
            }
            ControlInput::Palette(palette) => {
                self.sink.emit(&format!("Setting LEDs to palette: {palette}"));
                self.devices.set_led_palette(palette)
            }
            ControlInput::CameraDebug => {
                self.camera_debug();
                Ok(())
            }
            ControlInput::Status => {
                self.sink.emit(&self.status_line());
                Ok(())
            }
            ControlInput::Quit => {
                self.running = false;
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("{input:?} failed: {err}");
            self.sink.emit(&format!("Error: {err}"));
        }
    }

    fn on_devices_ready(&mut self) -> Result<(), DeviceError> {
        if self.state == GameState::Starting {
            self.enter_ready()
        } else {
            Ok(())
        }
    }

    /// Reset to READY: START and FUN lit, everything else dark.
    fn enter_ready(&mut self) -> Result<(), DeviceError> {
        self.state = GameState::Ready;
        self.autoplay = false;
        self.pending = None;
        self.devices.set_button_light(Button::Start, true, Some(false))?;
        self.devices.set_button_light(Button::Fun, true, None)?;
        self.devices.set_led_palette(LedPalette::Ready)?;
        self.sink.emit("Ready!");
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        if self.state == GameState::Starting {
            self.sink.emit("Still starting up, please wait");
            return Ok(());
        }
        self.sink.emit("Starting a game...");
        self.autoplay = false;
        self.pending = None;
        self.enter_human_turn()
    }

    fn enter_human_turn(&mut self) -> Result<(), DeviceError> {
        self.state = GameState::HumanTurn;
        if self.autoplay {
            self.pending = Some(Leg::AutoplayHuman);
            Ok(())
        } else {
            self.devices.set_button_light(Button::Player, true, Some(false))?;
            self.devices.set_led_palette(LedPalette::HumanTurn)
        }
    }

    /// End the human's turn. Ignored unless it is the human's turn and no
    /// leg is already scheduled.
    pub fn trigger_play(&mut self) {
        if self.state != GameState::HumanTurn || self.pending.is_some() {
            log::debug!("play ignored in {}", self.state);
            return;
        }
        self.state = GameState::ComputerTurn;
        self.pending = Some(Leg::Computer);
    }

    fn set_autoplay(&mut self, enabled: bool) -> Result<(), DeviceError> {
        if self.state == GameState::Starting {
            self.sink.emit("Still starting up, please wait");
            return Ok(());
        }
        self.sink.emit(&format!("Setting autoplay: {enabled}"));
        let was_enabled = self.autoplay;
        self.autoplay = enabled;
        if enabled {
            if self.pending.is_none() {
                self.state = GameState::HumanTurn;
                self.trigger_play();
            }
            Ok(())
        } else if was_enabled {
            self.enter_ready()
        } else {
            Ok(())
        }
    }

    fn run_leg(&mut self, leg: Leg) {
        match self.play_leg(leg) {
            Ok(()) => {
                self.failures = 0;
                self.sink.emit("DONE with my turn!");
                let next = match leg {
                    Leg::Computer => self.enter_human_turn(),
                    Leg::AutoplayHuman => {
                        self.state = GameState::HumanTurn;
                        self.trigger_play();
                        Ok(())
                    }
                };
                if let Err(err) = next {
                    self.sink.emit(&format!("Error: {err}"));
                }
            }
            Err(err) => {
                let delay = self.config.turn_retry.delay(self.failures);
                self.failures = self.failures.saturating_add(1);
                log::warn!("{leg:?} leg failed ({} in a row): {err}", self.failures);
                self.sink.emit(&format!(
                    "Failed to execute move! Retrying in {} seconds...",
                    delay.as_secs()
                ));
                self.sink.emit(&err.to_string());
                thread::sleep(delay);
                self.state = GameState::HumanTurn;
                self.pending = Some(leg);
            }
        }
        self.discard_stale_plays();
    }

    /// Play triggers that queued up while a leg ran are dropped.
    fn discard_stale_plays(&mut self) {
        let queued: Vec<_> = self.inputs.try_iter().collect();
        let before = self.backlog.len() + queued.len();
        self.backlog.extend(queued);
        self.backlog.retain(|input| *input != ControlInput::Play);
        let dropped = before - self.backlog.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} play triggers queued during the turn");
        }
    }

    fn play_leg(&mut self, leg: Leg) -> Result<(), TurnError> {
        match leg {
            Leg::Computer => {
                self.state = GameState::ComputerTurn;
                self.sink.emit("My turn!");
                self.devices.set_button_light(Button::Computer, true, Some(false))?;
                self.devices.set_led_palette(LedPalette::ComputerThink)?;
            }
            Leg::AutoplayHuman => {
                self.sink.emit("My turn (on the human's behalf)!");
                self.devices.set_button_light(Button::Player, true, Some(false))?;
                self.devices.set_led_palette(LedPalette::AutoplayHumanThink)?;
            }
        }

        self.sink.emit("Fetching image...");
        let frame = fetch_with_retry(
            &mut self.source,
            self.config.camera.retries,
            self.config.camera.retry_delay(),
            &*self.sink,
        )?;

        self.sink.emit("Analyzing image...");
        let board = self.detector.detect_board(&frame, leg.side())?;
        self.sink.emit(&format!(
            "Got board (from computer perspective):\n{}",
            board.render(true)
        ));

        let position = board.to_position()?;
        let mv = pick_move(&position, &mut self.rng)?;
        let from = mv.from().ok_or(TurnError::NoPlayableMove)?;
        let to = mv.to();
        let piece = board.identity_at(from).map_or("?", |p| p.name);
        self.sink.emit(&format!(
            "Making move: {piece} @ {}",
            mv.to_uci(CastlingMode::Standard)
        ));

        self.devices.set_led_palette(match leg {
            Leg::Computer => LedPalette::ComputerMove,
            Leg::AutoplayHuman => LedPalette::HumanTurn,
        })?;
        self.devices.set_electromagnet(false, true)?;
        self.move_to_square(from, true)?;
        self.devices.set_electromagnet(true, true)?;
        self.move_to_square(to, true)?;
        self.devices.set_electromagnet(false, true)?;
        Ok(())
    }

    fn move_to_square(&mut self, square: Square, block: bool) -> Result<(), DeviceError> {
        let index = square as u8;
        self.devices.move_gantry(index % 8, index / 8, block)
    }

    /// Snapshot the camera, write an annotated debug frame and print the
    /// board. Failures are reported, never retried.
    fn camera_debug(&mut self) {
        self.sink.emit("Fetching image...");
        let frame = match self.source.fetch() {
            Ok(frame) => frame,
            Err(err) => {
                self.sink.emit(&format!("Failed to load image: {err}"));
                return;
            }
        };

        self.sink.emit("Recognizing board...");
        let path = self.config.debug_image_path.clone();
        let detected = self.detector.inspect(&frame).and_then(|report| {
            let board = generate_board(report.assignments.iter().copied(), Color::Black)?;
            Ok::<_, DetectError>((report, board))
        });
        match detected {
            Ok((report, board)) => {
                match save_annotated(&path, &frame, &report) {
                    Ok(()) => self
                        .sink
                        .emit(&format!("Annotated frame written to {}", path.display())),
                    Err(err) => self
                        .sink
                        .emit(&format!("Couldn't write {}: {err}", path.display())),
                }
                self.sink.emit(&format!(
                    "Board (computer perspective):\n{}",
                    board.render(true)
                ));
            }
            Err(err) => {
                if let Err(save_err) = frame.save(&path) {
                    log::warn!("couldn't write raw frame: {save_err}");
                }
                self.sink
                    .emit(&format!("Failed to detect piece positions: {err}"));
            }
        }
    }
}
