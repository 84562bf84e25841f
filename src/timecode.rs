// HH:MM:SS:FF timecode codec

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TelemexError;

/// Frames per second used to convert the FF component to milliseconds.
/// The logger always records at 30 fps.
pub const FRAME_RATE: u64 = 30;

/// A frame-accurate time label in `HH:MM:SS:FF` form.
///
/// Components are not range-checked on parse: `01:75:00:00` is accepted and
/// simply yields a larger millisecond total. Ordering is lexicographic on the
/// (H, M, S, F) tuple; [`Timecode::to_millis`] is strictly increasing in that
/// order for canonical components at a fixed frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// Parses a `HH:MM:SS:FF` string. Requires exactly four `:`-separated
    /// integer components; anything else is `MalformedTimecode`.
    pub fn parse(text: &str) -> Result<Self, TelemexError> {
        let parts = text
            .split(':')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| TelemexError::MalformedTimecode {
                text: text.to_string(),
            })?;
        match parts[..] {
            [hours, minutes, seconds, frames] => Ok(Self::new(hours, minutes, seconds, frames)),
            _ => Err(TelemexError::MalformedTimecode {
                text: text.to_string(),
            }),
        }
    }

    /// Total milliseconds since `00:00:00:00`. Frame conversion truncates,
    /// matching the logger: 29 frames at 30 fps is 966 ms, not 967.
    pub fn to_millis(&self) -> u64 {
        let seconds =
            u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds);
        seconds * 1000 + u64::from(self.frames) * 1000 / FRAME_RATE
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}
