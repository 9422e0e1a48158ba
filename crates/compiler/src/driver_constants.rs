//! Playback-driver constants

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

// These values MUST match the playback driver.

pub const MAX_INSTRUMENTS: usize = 64;
pub const MAX_DPCM_SAMPLES: usize = 64;
pub const MAX_GROOVES: usize = 32;
pub const MAX_GROOVE_ENTRIES: usize = 128;

pub const MAX_EFFECT_COLUMNS: usize = 4;

pub const MAX_PATTERN_LENGTH: usize = 256;
pub const MAX_PATTERNS: usize = 256;
pub const MAX_FRAMES: usize = 256;

pub const MAX_N163_CHANNELS: u8 = 8;

pub const MAX_VOLUME: u8 = 15;

/// Compacted instrument values written by the pattern compiler
pub const NO_INSTRUMENT: u8 = MAX_INSTRUMENTS as u8;
pub const HOLD_INSTRUMENT: u8 = NO_INSTRUMENT + 1;

pub const DEFAULT_SPEED_SPLIT_POINT: u8 = 32;

pub mod stream {
    //! Compiled pattern byte ranges

    pub const REST: u8 = 0x00;

    /// Note index sentinels (written as `index + 1`)
    pub const NOTE_HALT: u8 = 0x7f - 1;
    pub const NOTE_RELEASE: u8 = 0x7f - 2;
    pub const NOTE_ECHO: u8 = 0x6f;

    pub const NOISE_NOTE_FLAG: u8 = 0x10;

    pub const FIRST_COMMAND: u8 = 0x80;
    pub const LAST_COMMAND: u8 = 0xdf;

    pub const PACKED_INSTRUMENT: u8 = 0xe0;
    pub const N_PACKED_INSTRUMENTS: u8 = 16;

    pub const PACKED_VOLUME: u8 = 0xf0;
}
