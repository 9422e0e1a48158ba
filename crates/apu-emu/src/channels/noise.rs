//! Noise channel

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::{ApuChannel, Envelope, LengthCounter, Output};
use crate::clock_domain::NTSC;
use crate::mixer::{ChannelId, Mixer};

#[derive(Debug, Clone, PartialEq)]
pub struct Noise {
    output: Output,

    envelope: Envelope,
    length: LengthCounter,

    period_table: &'static [u16; 16],
    period_index: u8,
    short_mode: bool,

    shift_register: u16,
    counter: u32,
}

impl Noise {
    pub(crate) fn new() -> Self {
        Self {
            output: Output::new(ChannelId::Noise),
            envelope: Envelope::default(),
            length: LengthCounter::default(),
            period_table: NTSC.noise_periods,
            period_index: 0,
            short_mode: false,
            shift_register: 1,
            counter: 1,
        }
    }

    pub(crate) fn set_period_table(&mut self, table: &'static [u16; 16]) {
        self.period_table = table;
    }

    pub fn period_index(&self) -> u8 {
        self.period_index
    }

    pub fn timer_period(&self) -> u16 {
        self.period_table[usize::from(self.period_index)]
    }

    pub fn is_short_mode(&self) -> bool {
        self.short_mode
    }

    pub fn length_counter(&self) -> u8 {
        self.length.value
    }

    pub(crate) fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn clock_length_counter(&mut self) {
        self.length.clock();
    }

    fn clock_shift_register(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let feedback = (self.shift_register ^ (self.shift_register >> tap)) & 1;
        self.shift_register = (self.shift_register >> 1) | (feedback << 14);
    }
}

impl ApuChannel for Noise {
    fn reset(&mut self) {
        let table = self.period_table;
        *self = Self::new();
        self.period_table = table;
    }

    fn write(&mut self, sub_register: u8, value: u8) {
        match sub_register {
            0 => {
                self.length.halt = self.envelope.write(value);
            }
            1 => {}
            2 => {
                self.short_mode = value & 0x80 != 0;
                self.period_index = value & 0x0f;
            }
            3 => {
                self.length.load(value);
                self.envelope.restart();
            }
            _ => unreachable!("invalid noise sub-register {sub_register}"),
        }
    }

    fn write_control(&mut self, value: u8) {
        self.length.set_enabled(value & 1 != 0);
    }

    fn read_control(&self) -> bool {
        self.length.is_active()
    }

    fn period(&self) -> u32 {
        self.counter
    }

    fn process<M: Mixer>(&mut self, cycles: u32, mixer: &mut M) {
        let mut cycles = cycles;

        while cycles >= self.counter {
            cycles -= self.counter;
            self.output.advance(self.counter);
            self.counter = u32::from(self.timer_period());

            self.clock_shift_register();

            let level = if self.length.is_active() && self.shift_register & 1 == 0 {
                self.envelope.output()
            } else {
                0
            };
            self.output.mix(level, mixer);
        }

        self.counter -= cycles;
        self.output.advance(cycles);
    }

    fn end_frame(&mut self) {
        self.output.end_frame();
    }

    fn frequency(&self, clock_rate: u32) -> f64 {
        f64::from(clock_rate) / f64::from(self.timer_period())
    }
}
