//! Pulse channel

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::{ApuChannel, Envelope, LengthCounter, Output};
use crate::mixer::{ChannelId, Mixer};

const DUTY_TABLE: [[u8; 16]; 4] = [
    [0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const MAX_PERIOD: u16 = 0x7ff;
const MIN_AUDIBLE_PERIOD: u16 = 8;

#[derive(Debug, Default, Clone, PartialEq)]
struct Sweep {
    enabled: bool,
    period: u8,
    negate: bool,
    shift: u8,

    reload: bool,
    divider: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Square {
    output: Output,

    // Pulse 1 subtracts an extra 1 when negating the sweep (ones' complement)
    negate_diff: u16,

    envelope: Envelope,
    length: LengthCounter,
    sweep: Sweep,

    duty: u8,
    duty_step: u8,

    period: u16,
    counter: u32,
}

impl Square {
    pub(crate) fn new(channel: ChannelId) -> Self {
        let negate_diff = match channel {
            ChannelId::Pulse1 => 1,
            _ => 0,
        };

        Self {
            output: Output::new(channel),
            negate_diff,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
            sweep: Sweep::default(),
            duty: 0,
            duty_step: 0,
            period: 0,
            counter: 1,
        }
    }

    pub fn timer_period(&self) -> u16 {
        self.period
    }

    pub fn length_counter(&self) -> u8 {
        self.length.value
    }

    pub fn envelope_output(&self) -> u8 {
        self.envelope.output()
    }

    fn sweep_target(&self) -> u16 {
        let change = self.period >> self.sweep.shift;

        if self.sweep.negate {
            self.period.saturating_sub(change + self.negate_diff)
        } else {
            self.period + change
        }
    }

    fn is_muted(&self) -> bool {
        self.period < MIN_AUDIBLE_PERIOD || (!self.sweep.negate && self.sweep_target() > MAX_PERIOD)
    }

    fn is_audible(&self) -> bool {
        self.length.enabled && self.length.is_active() && !self.is_muted()
    }

    pub(crate) fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn clock_length_counter(&mut self) {
        self.length.clock();
    }

    pub(crate) fn clock_sweep(&mut self) {
        if self.sweep.divider == 0 && self.sweep.enabled && self.sweep.shift > 0 && !self.is_muted()
        {
            self.period = self.sweep_target() & MAX_PERIOD;
        }

        if self.sweep.divider == 0 || self.sweep.reload {
            self.sweep.divider = self.sweep.period;
            self.sweep.reload = false;
        } else {
            self.sweep.divider -= 1;
        }
    }

    fn level(&self) -> u8 {
        if self.is_audible() {
            DUTY_TABLE[usize::from(self.duty)][usize::from(self.duty_step)] * self.envelope.output()
        } else {
            0
        }
    }
}

impl ApuChannel for Square {
    fn reset(&mut self) {
        let channel = self.output.channel;
        *self = Self::new(channel);
    }

    fn write(&mut self, sub_register: u8, value: u8) {
        match sub_register {
            0 => {
                self.duty = value >> 6;
                self.length.halt = self.envelope.write(value);
            }
            1 => {
                self.sweep.enabled = value & 0x80 != 0;
                self.sweep.period = (value >> 4) & 0x07;
                self.sweep.negate = value & 0x08 != 0;
                self.sweep.shift = value & 0x07;
                self.sweep.reload = true;
            }
            2 => {
                self.period = (self.period & 0x0700) | u16::from(value);
            }
            3 => {
                self.period = (self.period & 0x00ff) | (u16::from(value & 0x07) << 8);
                self.length.load(value);
                self.envelope.restart();
                self.duty_step = 0;
            }
            _ => unreachable!("invalid pulse sub-register {sub_register}"),
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
            self.counter = u32::from(self.period) + 1;

            self.duty_step = (self.duty_step + 1) & 0x0f;

            let level = self.level();
            self.output.mix(level, mixer);
        }

        self.counter -= cycles;
        self.output.advance(cycles);
    }

    fn end_frame(&mut self) {
        self.output.end_frame();
    }

    fn frequency(&self, clock_rate: u32) -> f64 {
        f64::from(clock_rate) / (16.0 * (f64::from(self.period) + 1.0))
    }
}
