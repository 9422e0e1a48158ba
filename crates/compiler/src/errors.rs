//! A single location for all of the errors in the compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::channel_map::ChannelId;
use crate::notes::MidiNote;
use crate::sound_chips::SoundChip;

use std::fmt::Display;
use std::io;

#[derive(Debug)]
pub enum DeserializeError {
    NoParentPath(String),
    OpenError(String, io::Error),
    SerdeError(String, serde_json::error::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    InstrumentIdOutOfRange(u32),
    VolumeOutOfRange(u32),
    MidiNoteOutOfRange(u32),
    EchoOffsetOutOfRange(u32),
    DpcmSampleOutOfRange(u32),
    DpcmPitchOutOfRange(u32),
    GrooveIdOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteError {
    CannotParseNote(String),
    UnknownNote(char),
    InvalidNoteOctave(u32),
    InvalidNote,
    Value(ValueError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowError {
    NotEnoughColumns,
    TooManyEffects(usize),
    Note(NoteError),
    InvalidInstrument(String),
    InvalidVolume(String),
    InvalidEffect(String),
    UnknownEffect(char, SoundChip),
}

#[derive(Debug)]
pub enum SongError {
    PatternLengthOutOfRange(u32),
    SpeedOutOfRange(u32),
    TempoOutOfRange(u32),
    WrongNumberOfChannels {
        expected: usize,
        found: usize,
    },
    NoFrames,
    TooManyFrames(usize),
    FrameWrongNumberOfChannels {
        frame: usize,
        expected: usize,
        found: usize,
    },
    FramePatternOutOfRange {
        frame: usize,
        channel: ChannelId,
        pattern: u32,
    },
    EffectColumnsOutOfRange {
        channel: ChannelId,
        columns: u32,
    },
    InvalidPatternIndex {
        channel: ChannelId,
        index: String,
    },
    TooManyRows {
        channel: ChannelId,
        pattern: u8,
        rows: usize,
    },
    Row {
        channel: ChannelId,
        pattern: u8,
        row: usize,
        error: RowError,
    },
}

#[derive(Debug)]
pub enum ModuleError {
    N163ChannelsOutOfRange(u32),

    InvalidInstrumentId(ValueError),
    DuplicateInstrumentId(u8),
    DpcmOnNon2a03Instrument(u8),
    DpcmNote {
        instrument: u8,
        error: NoteError,
    },
    DuplicateDpcmNote {
        instrument: u8,
        note: MidiNote,
    },
    DpcmAssignment {
        instrument: u8,
        note: MidiNote,
        error: ValueError,
    },

    TooManyDpcmSamples(usize),

    InvalidGrooveId(ValueError),
    DuplicateGrooveId(u8),
    InvalidGrooveSize {
        groove: u8,
        size: usize,
    },
    GrooveEntryZero(u8),

    NoSongs,
    Song {
        index: usize,
        name: String,
        error: SongError,
    },
}

#[derive(Debug)]
pub struct ModuleErrors(pub Vec<ModuleError>);

#[derive(Debug)]
pub enum ExportError {
    SongNotFound(usize),
    TooManyDpcmSlots(usize),
}

impl From<NoteError> for RowError {
    fn from(e: NoteError) -> Self {
        Self::Note(e)
    }
}

impl From<ValueError> for NoteError {
    fn from(e: ValueError) -> Self {
        Self::Value(e)
    }
}

impl Display for DeserializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoParentPath(filename) => {
                write!(f, "Cannot load {}: No parent path", filename)
            }
            Self::OpenError(filename, e) => write!(f, "Unable to open {}: {}", filename, e),
            Self::SerdeError(filename, e) => write!(f, "Unable to read {}: {}", filename, e),
        }
    }
}

impl Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstrumentIdOutOfRange(v) => write!(f, "instrument id out of range ({})", v),
            Self::VolumeOutOfRange(v) => write!(f, "volume out of range ({})", v),
            Self::MidiNoteOutOfRange(v) => write!(f, "note out of range ({})", v),
            Self::EchoOffsetOutOfRange(v) => write!(f, "echo offset out of range ({})", v),
            Self::DpcmSampleOutOfRange(v) => write!(f, "DPCM sample out of range ({})", v),
            Self::DpcmPitchOutOfRange(v) => write!(f, "DPCM pitch out of range ({})", v),
            Self::GrooveIdOutOfRange(v) => write!(f, "groove id out of range ({})", v),
        }
    }
}

impl Display for NoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CannotParseNote(s) => write!(f, "cannot parse note: {}", s),
            Self::UnknownNote(c) => write!(f, "unknown note: {}", c),
            Self::InvalidNoteOctave(o) => write!(f, "invalid octave: {}", o),
            Self::InvalidNote => write!(f, "invalid note"),
            Self::Value(e) => e.fmt(f),
        }
    }
}

impl Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughColumns => write!(f, "expected note, instrument and volume columns"),
            Self::TooManyEffects(n) => write!(f, "too many effect columns ({})", n),
            Self::Note(e) => e.fmt(f),
            Self::InvalidInstrument(s) => write!(f, "invalid instrument: {}", s),
            Self::InvalidVolume(s) => write!(f, "invalid volume: {}", s),
            Self::InvalidEffect(s) => write!(f, "invalid effect: {}", s),
            Self::UnknownEffect(c, chip) => write!(f, "unknown {} effect: {}", chip, c),
        }
    }
}

impl Display for SongError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatternLengthOutOfRange(v) => write!(f, "pattern length out of range ({})", v),
            Self::SpeedOutOfRange(v) => write!(f, "speed out of range ({})", v),
            Self::TempoOutOfRange(v) => write!(f, "tempo out of range ({})", v),
            Self::WrongNumberOfChannels { expected, found } => {
                write!(f, "expected {} channels, found {}", expected, found)
            }
            Self::NoFrames => write!(f, "no frames"),
            Self::TooManyFrames(n) => write!(f, "too many frames ({})", n),
            Self::FrameWrongNumberOfChannels {
                frame,
                expected,
                found,
            } => write!(
                f,
                "frame {}: expected {} patterns, found {}",
                frame, expected, found
            ),
            Self::FramePatternOutOfRange {
                frame,
                channel,
                pattern,
            } => write!(
                f,
                "frame {}, {}: pattern out of range ({})",
                frame, channel, pattern
            ),
            Self::EffectColumnsOutOfRange { channel, columns } => {
                write!(f, "{}: effect columns out of range ({})", channel, columns)
            }
            Self::InvalidPatternIndex { channel, index } => {
                write!(f, "{}: invalid pattern index {}", channel, index)
            }
            Self::TooManyRows {
                channel,
                pattern,
                rows,
            } => write!(
                f,
                "{} pattern {}: too many rows ({})",
                channel, pattern, rows
            ),
            Self::Row {
                channel,
                pattern,
                row,
                error,
            } => write!(
                f,
                "{} pattern {} row {}: {}",
                channel, pattern, row, error
            ),
        }
    }
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::N163ChannelsOutOfRange(n) => {
                write!(f, "N163 channel count out of range ({})", n)
            }
            Self::InvalidInstrumentId(e) => write!(f, "instrument: {}", e),
            Self::DuplicateInstrumentId(id) => write!(f, "duplicate instrument id: {:02X}", id),
            Self::DpcmOnNon2a03Instrument(id) => write!(
                f,
                "instrument {:02X}: only 2A03 instruments have DPCM assignments",
                id
            ),
            Self::DpcmNote { instrument, error } => {
                write!(f, "instrument {:02X}: DPCM note: {}", instrument, error)
            }
            Self::DuplicateDpcmNote { instrument, note } => write!(
                f,
                "instrument {:02X}: duplicate DPCM assignment for {}",
                instrument, note
            ),
            Self::DpcmAssignment {
                instrument,
                note,
                error,
            } => write!(f, "instrument {:02X} {}: {}", instrument, note, error),
            Self::TooManyDpcmSamples(n) => write!(f, "too many DPCM samples ({})", n),
            Self::InvalidGrooveId(e) => write!(f, "groove: {}", e),
            Self::DuplicateGrooveId(id) => write!(f, "duplicate groove id: {}", id),
            Self::InvalidGrooveSize { groove, size } => {
                write!(f, "groove {}: invalid size ({})", groove, size)
            }
            Self::GrooveEntryZero(id) => write!(f, "groove {}: entries cannot be 0", id),
            Self::NoSongs => write!(f, "no songs"),
            Self::Song { index, name, error } => {
                write!(f, "song {} ({}): {}", index, name, error)
            }
        }
    }
}

impl Display for ModuleErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for e in &self.0 {
            writeln!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SongNotFound(i) => write!(f, "cannot find song {}", i),
            Self::TooManyDpcmSlots(n) => write!(f, "too many DPCM sample slots ({})", n),
        }
    }
}
