//! Triangle channel

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::{ApuChannel, LengthCounter, Output};
use crate::mixer::{ChannelId, Mixer};

const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15,
];

#[derive(Debug, Default, Clone, PartialEq)]
struct LinearCounter {
    control: bool,
    reload_value: u8,
    reload: bool,
    value: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    output: Output,

    length: LengthCounter,
    linear: LinearCounter,

    step: u8,
    period: u16,
    counter: u32,
}

impl Triangle {
    pub(crate) fn new() -> Self {
        Self {
            output: Output::new(ChannelId::Triangle),
            length: LengthCounter::default(),
            linear: LinearCounter::default(),
            step: 0,
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

    pub fn linear_counter(&self) -> u8 {
        self.linear.value
    }

    pub(crate) fn clock_linear_counter(&mut self) {
        if self.linear.reload {
            self.linear.value = self.linear.reload_value;
        } else if self.linear.value > 0 {
            self.linear.value -= 1;
        }

        if !self.linear.control {
            self.linear.reload = false;
        }
    }

    pub(crate) fn clock_length_counter(&mut self) {
        self.length.clock();
    }
}

impl ApuChannel for Triangle {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn write(&mut self, sub_register: u8, value: u8) {
        match sub_register {
            0 => {
                self.linear.control = value & 0x80 != 0;
                self.linear.reload_value = value & 0x7f;
                self.length.halt = self.linear.control;
            }
            1 => {}
            2 => {
                self.period = (self.period & 0x0700) | u16::from(value);
            }
            3 => {
                self.period = (self.period & 0x00ff) | (u16::from(value & 0x07) << 8);
                self.length.load(value);
                self.linear.reload = true;
            }
            _ => unreachable!("invalid triangle sub-register {sub_register}"),
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

            if self.length.is_active() && self.linear.value > 0 {
                self.step = (self.step + 1) & 0x1f;

                // Ultrasonic periods are not mixed
                if self.period > 1 {
                    let level = TRIANGLE_SEQUENCE[usize::from(self.step)];
                    self.output.mix(level, mixer);
                }
            }
        }

        self.counter -= cycles;
        self.output.advance(cycles);
    }

    fn end_frame(&mut self) {
        self.output.end_frame();
    }

    fn frequency(&self, clock_rate: u32) -> f64 {
        f64::from(clock_rate) / (32.0 * (f64::from(self.period) + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::LevelMixer;

    #[test]
    fn linear_counter_reload() {
        let mut tri = Triangle::new();
        tri.write_control(1);
        tri.write(0, 0x05);
        tri.write(3, 0x08);

        tri.clock_linear_counter();
        assert_eq!(tri.linear_counter(), 5);

        tri.clock_linear_counter();
        assert_eq!(tri.linear_counter(), 4);
    }

    #[test]
    fn linear_counter_control_keeps_reloading() {
        let mut tri = Triangle::new();
        tri.write_control(1);
        tri.write(0, 0x85);
        tri.write(3, 0x08);

        tri.clock_linear_counter();
        tri.clock_linear_counter();
        tri.clock_linear_counter();
        assert_eq!(tri.linear_counter(), 5);
    }

    #[test]
    fn silent_without_linear_counter() {
        let mut tri = Triangle::new();
        tri.write_control(1);
        tri.write(0, 0x00);
        tri.write(2, 0x40);
        tri.write(3, 0x08);

        let mut mixer = LevelMixer::new();
        tri.clock_linear_counter();
        tri.process(10_000, &mut mixer);

        assert_eq!(mixer.level_changes(ChannelId::Triangle), 0);
    }

    #[test]
    fn sequencer_steps_while_counters_active() {
        let mut tri = Triangle::new();
        tri.write_control(1);
        tri.write(0, 0x7f);
        tri.write(2, 0x40);
        tri.write(3, 0x08);
        tri.clock_linear_counter();

        let mut mixer = LevelMixer::new();
        tri.process(1 + 0x41 * 4, &mut mixer);

        // steps 1 to 5
        assert_eq!(mixer.level_changes(ChannelId::Triangle), 5);
        assert_eq!(mixer.level(ChannelId::Triangle), 10);
    }
}
