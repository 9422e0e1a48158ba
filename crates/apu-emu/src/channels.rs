//! APU channel generators

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod dpcm;
mod noise;
mod square;
mod triangle;

pub use dpcm::Dpcm;
pub use noise::Noise;
pub use square::Square;
pub use triangle::Triangle;

use crate::mixer::{ChannelId, Mixer};

const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// The operations the `Apu` performs on every channel.
///
/// Envelope, sweep and linear counter clocking differ between the channel types and are
/// inherent methods.
pub trait ApuChannel {
    fn reset(&mut self);

    /// `sub_register` MUST be 0-3.
    fn write(&mut self, sub_register: u8, value: u8);

    /// Bit 0 of `value` is the channel's enable flag in the status register.
    fn write_control(&mut self, value: u8);

    /// The channel's active flag in the status register.
    fn read_control(&self) -> bool;

    /// Number of cycles until the next output event.
    fn period(&self) -> u32;

    fn process<M: Mixer>(&mut self, cycles: u32, mixer: &mut M);

    fn end_frame(&mut self);

    fn frequency(&self, clock_rate: u32) -> f64;
}

/// Tracks the output level of a channel and forwards changes to the mixer.
#[derive(Debug, Clone, PartialEq)]
struct Output {
    channel: ChannelId,
    level: u8,
    frame_time: u32,
}

impl Output {
    fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            level: 0,
            frame_time: 0,
        }
    }

    fn advance(&mut self, cycles: u32) {
        self.frame_time = self.frame_time.wrapping_add(cycles);
    }

    fn mix<M: Mixer>(&mut self, level: u8, mixer: &mut M) {
        if self.level != level {
            self.level = level;
            mixer.add_value(self.channel, level, self.frame_time);
        }
    }

    fn end_frame(&mut self) {
        self.frame_time = 0;
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct LengthCounter {
    enabled: bool,
    halt: bool,
    value: u8,
}

impl LengthCounter {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.value = 0;
        }
    }

    fn load(&mut self, register_value: u8) {
        if self.enabled {
            self.value = LENGTH_TABLE[usize::from(register_value >> 3)];
        }
    }

    fn clock(&mut self) {
        if !self.halt && self.value > 0 {
            self.value -= 1;
        }
    }

    fn is_active(&self) -> bool {
        self.value > 0
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Envelope {
    looping: bool,
    constant_volume: bool,
    // Volume if `constant_volume` is set, otherwise the divider period
    volume: u8,

    start: bool,
    divider: u8,
    decay: u8,
}

impl Envelope {
    /// Also returns the length counter halt flag (bit 5)
    fn write(&mut self, value: u8) -> bool {
        self.looping = value & 0x20 != 0;
        self.constant_volume = value & 0x10 != 0;
        self.volume = value & 0x0f;

        self.looping
    }

    fn restart(&mut self) {
        self.start = true;
    }

    fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay = 15;
            self.divider = self.volume;
        } else if self.divider > 0 {
            self.divider -= 1;
        } else {
            self.divider = self.volume;

            if self.decay > 0 {
                self.decay -= 1;
            } else if self.looping {
                self.decay = 15;
            }
        }
    }

    fn output(&self) -> u8 {
        if self.constant_volume {
            self.volume
        } else {
            self.decay
        }
    }
}
