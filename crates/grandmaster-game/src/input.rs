//! Control inputs: operator commands and device events, all on one queue.

use crate::ParseInputError;
use grandmaster_core::SharedSink;
use grandmaster_devices::{Button, ButtonHandlers, DeviceError, LedPalette};
use shakmaty::Square;
use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlInput {
    /// Start a one-player game.
    Start,
    /// End the human's turn.
    Play,
    Autoplay(bool),
    /// Manual, non-blocking gantry move.
    MoveTo(Square),
    /// Manual, non-blocking electromagnet switch.
    Magnet(bool),
    ButtonLight { button: Button, enabled: bool },
    Palette(LedPalette),
    /// Annotated camera snapshot.
    CameraDebug,
    Status,
    Quit,
    /// Both controllers are up. Never typed, only sent by the device layer.
    DevicesReady,
}

fn on_off(command: &'static str, arg: Option<&str>) -> Result<bool, ParseInputError> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        Some(other) => Err(ParseInputError::InvalidArgument {
            command,
            reason: format!("expected on or off, got '{other}'"),
        }),
        None => Err(ParseInputError::MissingArgument {
            command,
            expected: "on or off",
        }),
    }
}

impl FromStr for ControlInput {
    type Err = ParseInputError;

    /// Parse one command line. Case is ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let lowered = line.trim().to_ascii_lowercase();
        let mut words = lowered.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseInputError::Unknown(line.trim().to_string()));
        };
        let arg = words.next();

        Ok(match command {
            "start" => ControlInput::Start,
            "play" => ControlInput::Play,
            "camshow" => ControlInput::CameraDebug,
            "status" => ControlInput::Status,
            "exit" | "quit" => ControlInput::Quit,
            "autoplay" => ControlInput::Autoplay(on_off("autoplay", arg)?),
            "magnet" => ControlInput::Magnet(on_off("magnet", arg)?),
            "move" => {
                let arg = arg.ok_or(ParseInputError::MissingArgument {
                    command: "move",
                    expected: "a square",
                })?;
                let square = arg
                    .parse::<Square>()
                    .map_err(|_| ParseInputError::InvalidArgument {
                        command: "move",
                        reason: format!("'{arg}' is not a square"),
                    })?;
                ControlInput::MoveTo(square)
            }
            "bled" => {
                let name = arg.ok_or(ParseInputError::MissingArgument {
                    command: "bled",
                    expected: "a button and on or off",
                })?;
                let button = name
                    .parse::<Button>()
                    .map_err(|reason| ParseInputError::InvalidArgument {
                        command: "bled",
                        reason,
                    })?;
                let enabled = on_off("bled", words.next())?;
                ControlInput::ButtonLight { button, enabled }
            }
            "leds" => {
                let name = arg.ok_or(ParseInputError::MissingArgument {
                    command: "leds",
                    expected: "a palette",
                })?;
                let palette = name
                    .parse::<LedPalette>()
                    .map_err(|reason| ParseInputError::InvalidArgument {
                        command: "leds",
                        reason,
                    })?;
                ControlInput::Palette(palette)
            }
            _ => return Err(ParseInputError::Unknown(line.trim().to_string())),
        })
    }
}

pub fn control_channel() -> (Sender<ControlInput>, Receiver<ControlInput>) {
    mpsc::channel()
}

/// PLAYER and COMPUTER end the human turn, FUN starts autoplay, START starts
/// a game. Handlers only enqueue.
pub fn default_button_handlers(tx: &Sender<ControlInput>) -> Result<ButtonHandlers, DeviceError> {
    let send = |input: ControlInput| {
        let tx = tx.clone();
        move || {
            let _ = tx.send(input);
        }
    };
    ButtonHandlers::new()
        .with(Button::Player, send(ControlInput::Play))?
        .with(Button::Computer, send(ControlInput::Play))?
        .with(Button::Fun, send(ControlInput::Autoplay(true)))?
        .with(Button::Start, send(ControlInput::Start))
}

/// Device-ready callback that enqueues [`ControlInput::DevicesReady`].
pub fn ready_callback(tx: &Sender<ControlInput>) -> impl FnOnce() + Send + 'static {
    let tx = tx.clone();
    move || {
        let _ = tx.send(ControlInput::DevicesReady);
    }
}

/// Read command lines on a background thread.
///
/// Lines that don't parse are reported through `sink`; end of input sends
/// [`ControlInput::Quit`].
pub fn spawn_line_reader<R>(reader: R, tx: Sender<ControlInput>, sink: SharedSink) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("control input closed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ControlInput>() {
                Ok(input) => {
                    if tx.send(input).is_err() {
                        return;
                    }
                }
                Err(err) => sink.emit(&err.to_string()),
            }
        }
        let _ = tx.send(ControlInput::Quit);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandmaster_core::MemorySink;
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn parses_every_command() {
        let cases = [
            ("start", ControlInput::Start),
            ("PLAY", ControlInput::Play),
            ("autoplay on", ControlInput::Autoplay(true)),
            ("autoplay off", ControlInput::Autoplay(false)),
            ("move e4", ControlInput::MoveTo(Square::E4)),
            ("Move A1", ControlInput::MoveTo(Square::A1)),
            ("magnet on", ControlInput::Magnet(true)),
            (
                "bled player off",
                ControlInput::ButtonLight {
                    button: Button::Player,
                    enabled: false,
                },
            ),
            ("leds computer_move", ControlInput::Palette(LedPalette::ComputerMove)),
            ("camshow", ControlInput::CameraDebug),
            ("status", ControlInput::Status),
            ("exit", ControlInput::Quit),
            ("quit", ControlInput::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<ControlInput>(), Ok(expected), "{line}");
        }
    }

    #[test]
    fn bad_lines_are_errors() {
        assert_eq!(
            "dance".parse::<ControlInput>(),
            Err(ParseInputError::Unknown("dance".into()))
        );
        assert!(matches!(
            "move".parse::<ControlInput>(),
            Err(ParseInputError::MissingArgument { command: "move", .. })
        ));
        assert!(matches!(
            "move z9".parse::<ControlInput>(),
            Err(ParseInputError::InvalidArgument { command: "move", .. })
        ));
        assert!(matches!(
            "magnet maybe".parse::<ControlInput>(),
            Err(ParseInputError::InvalidArgument { command: "magnet", .. })
        ));
        assert!(matches!(
            "bled start".parse::<ControlInput>(),
            Err(ParseInputError::MissingArgument { command: "bled", .. })
        ));
        assert!(matches!(
            "leds rainbow".parse::<ControlInput>(),
            Err(ParseInputError::InvalidArgument { command: "leds", .. })
        ));
    }

    #[test]
    fn line_reader_forwards_and_reports() {
        let (tx, rx) = control_channel();
        let sink = Arc::new(MemorySink::new());
        let input = Cursor::new("start\n\nfly away\nplay\n");
        spawn_line_reader(input, tx, sink.clone())
            .join()
            .expect("reader thread");
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![ControlInput::Start, ControlInput::Play, ControlInput::Quit]
        );
        assert!(sink.contains("Unknown Command: 'fly away'"));
    }

    #[test]
    fn button_handlers_cover_all_buttons() {
        let (tx, _rx) = control_channel();
        let handlers = default_button_handlers(&tx).expect("handlers");
        for button in Button::ALL {
            assert!(handlers.contains(button));
        }
    }
}
