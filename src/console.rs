//! Text commands that drive an annotation session from a terminal.

use thiserror::Error;

use crate::annotations::Intensity;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Point marker; `None` falls back to the configured default intensity.
    Mark {
        position: usize,
        intensity: Option<Intensity>,
    },
    /// One click of the two-click section protocol.
    Section { position: usize },
    Cancel,
    Resize {
        index: usize,
        start: usize,
        end: usize,
    },
    Delete { index: usize },
    /// Delete whichever entry lies closest to `position`.
    DeleteNear { position: usize },
    List,
    Window { min: f64, max: f64 },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: {0}")]
    BadNumber(String),
    #[error("{0}")]
    BadIntensity(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Usage("<command> [args...]"));
        };
        let args: Vec<&str> = words.collect();

        match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("mark" | "m", [position]) => Ok(Command::Mark {
                position: number(position)?,
                intensity: None,
            }),
            ("mark" | "m", [position, intensity]) => Ok(Command::Mark {
                position: number(position)?,
                intensity: Some(intensity.parse().map_err(CommandError::BadIntensity)?),
            }),
            ("mark" | "m", _) => Err(CommandError::Usage("mark <position> [intensity]")),

            ("section" | "s", [position]) => Ok(Command::Section {
                position: number(position)?,
            }),
            ("section" | "s", _) => Err(CommandError::Usage("section <position>")),

            ("cancel" | "c", []) => Ok(Command::Cancel),

            ("resize" | "r", [index, start, end]) => Ok(Command::Resize {
                index: number(index)?,
                start: number(start)?,
                end: number(end)?,
            }),
            ("resize" | "r", _) => Err(CommandError::Usage("resize <index> <start> <end>")),

            ("delete" | "d", [index]) => Ok(Command::Delete {
                index: number(index)?,
            }),
            ("delete" | "d", ["near" | "@", position]) => Ok(Command::DeleteNear {
                position: number(position)?,
            }),
            ("delete" | "d", _) => Err(CommandError::Usage("delete <index> | delete near <position>")),

            ("list" | "l", []) => Ok(Command::List),

            ("window" | "w", [min, max]) => Ok(Command::Window {
                min: float(min)?,
                max: float(max)?,
            }),
            ("window" | "w", _) => Err(CommandError::Usage("window <min> <max>")),

            ("quit" | "q" | "exit", []) => Ok(Command::Quit),

            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn number(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadNumber(word.to_string()))
}

fn float(word: &str) -> Result<f64, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadNumber(word.to_string()))
}
