//! Pattern notes

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

#![allow(clippy::assertions_on_constants)]

use crate::errors::{NoteError, ValueError};
use crate::newtype_macros::u8_newtype;

use std::fmt::Display;

pub const LAST_OCTAVE: u8 = 7;
pub const SEMITONES_PER_OCTAVE: u8 = 12;
pub const LAST_NOTE_ID: u8 = (LAST_OCTAVE + 1) * SEMITONES_PER_OCTAVE - 1;
pub const N_NOTES: usize = LAST_NOTE_ID as usize + 1;

pub const LAST_ECHO_OFFSET: u8 = 3;

const NOTE_NAMES: [&str; SEMITONES_PER_OCTAVE as usize] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

u8_newtype!(MidiNote, MidiNoteOutOfRange, 0, LAST_NOTE_ID);
u8_newtype!(EchoOffset, EchoOffsetOutOfRange, 0, LAST_ECHO_OFFSET);

fn parse_pitch_char(c: char) -> Result<u8, NoteError> {
    match c {
        'C' => Ok(0),
        'D' => Ok(2),
        'E' => Ok(4),
        'F' => Ok(5),
        'G' => Ok(7),
        'A' => Ok(9),
        'B' => Ok(11),

        n => Err(NoteError::UnknownNote(n)),
    }
}

impl MidiNote {
    pub fn from_octave_semitone(octave: u8, semitone: u8) -> Result<Self, NoteError> {
        if octave > LAST_OCTAVE {
            return Err(NoteError::InvalidNoteOctave(octave.into()));
        }
        if semitone >= SEMITONES_PER_OCTAVE {
            return Err(NoteError::InvalidNote);
        }
        assert!((LAST_OCTAVE + 1) * SEMITONES_PER_OCTAVE < u8::MAX);

        Ok(Self(octave * SEMITONES_PER_OCTAVE + semitone))
    }

    pub fn octave(&self) -> u8 {
        self.0 / SEMITONES_PER_OCTAVE
    }

    pub fn semitone(&self) -> u8 {
        self.0 % SEMITONES_PER_OCTAVE
    }

    /// Parses a tracker note (`C-4`, `F#2`).
    pub fn parse(s: &str) -> Result<Self, NoteError> {
        let b = s.as_bytes();
        if b.len() != 3 {
            return Err(NoteError::CannotParseNote(s.to_owned()));
        }

        let pitch = parse_pitch_char(char::from(b[0]))?;

        let semitone = match b[1] {
            b'-' => pitch,
            // There is no E# or B#
            b'#' if pitch != 4 && pitch != 11 => pitch + 1,
            _ => return Err(NoteError::CannotParseNote(s.to_owned())),
        };

        let octave = match char::from(b[2]).to_digit(10) {
            Some(o) => o,
            None => return Err(NoteError::CannotParseNote(s.to_owned())),
        };
        let octave = match u8::try_from(octave) {
            Ok(o) if o <= LAST_OCTAVE => o,
            _ => return Err(NoteError::InvalidNoteOctave(octave)),
        };

        Self::from_octave_semitone(octave, semitone)
    }
}

impl Display for MidiNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            NOTE_NAMES[usize::from(self.semitone())],
            self.octave()
        )
    }
}

/// The note column of a pattern row
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Note {
    #[default]
    None,
    Halt,
    Release,
    Echo(EchoOffset),
    Pitched(MidiNote),
}

impl Note {
    /// Parses the note column of a row.
    ///
    /// `...` is no note, `---` is a note halt, `===` is a note release, `^-N` is an echo
    /// note and `X-#` is a noise note (X is a hex digit).
    pub fn parse(s: &str) -> Result<Self, NoteError> {
        match s {
            "..." => Ok(Note::None),
            "---" => Ok(Note::Halt),
            "===" => Ok(Note::Release),
            _ => {
                let b = s.as_bytes();

                if b.len() == 3 && b[0] == b'^' && b[1] == b'-' {
                    let offset = match char::from(b[2]).to_digit(10) {
                        Some(o) => o,
                        None => return Err(NoteError::CannotParseNote(s.to_owned())),
                    };
                    return match EchoOffset::try_from(offset) {
                        Ok(o) => Ok(Note::Echo(o)),
                        Err(e) => Err(NoteError::Value(e)),
                    };
                }

                if b.len() == 3 && b[1] == b'-' && b[2] == b'#' {
                    return match char::from(b[0]).to_digit(16) {
                        Some(n) => Ok(Note::Pitched(MidiNote(n as u8))),
                        None => Err(NoteError::CannotParseNote(s.to_owned())),
                    };
                }

                MidiNote::parse(s).map(Note::Pitched)
            }
        }
    }

    pub fn is_pitched(&self) -> bool {
        matches!(self, Note::Pitched(_))
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Note::None => f.write_str("..."),
            Note::Halt => f.write_str("---"),
            Note::Release => f.write_str("==="),
            Note::Echo(o) => write!(f, "^-{}", o.as_u8()),
            Note::Pitched(n) => n.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midi(s: &str) -> u8 {
        MidiNote::parse(s).unwrap().as_u8()
    }

    #[test]
    fn parse_midi_notes() {
        assert_eq!(midi("C-0"), 0);
        assert_eq!(midi("C#0"), 1);
        assert_eq!(midi("A-4"), 57);
        assert_eq!(midi("B-7"), LAST_NOTE_ID);

        assert!(MidiNote::parse("C-8").is_err());
        assert!(MidiNote::parse("E#4").is_err());
        assert!(MidiNote::parse("H-4").is_err());
        assert!(MidiNote::parse("C-").is_err());
        assert!(MidiNote::parse("c-4").is_err());
    }

    #[test]
    fn parse_special_notes() {
        assert_eq!(Note::parse("...").unwrap(), Note::None);
        assert_eq!(Note::parse("---").unwrap(), Note::Halt);
        assert_eq!(Note::parse("===").unwrap(), Note::Release);
        assert_eq!(
            Note::parse("^-2").unwrap(),
            Note::Echo(EchoOffset::try_from(2u8).unwrap())
        );
        assert!(Note::parse("^-4").is_err());
    }

    #[test]
    fn parse_noise_notes() {
        assert_eq!(
            Note::parse("C-#").unwrap(),
            Note::Pitched(MidiNote::try_from(12u8).unwrap())
        );
        assert_eq!(
            Note::parse("0-#").unwrap(),
            Note::Pitched(MidiNote::try_from(0u8).unwrap())
        );
    }

    #[test]
    fn display() {
        for s in ["...", "---", "===", "^-1", "C-4", "G#7"] {
            assert_eq!(Note::parse(s).unwrap().to_string(), s);
        }
    }
}
