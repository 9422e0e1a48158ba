//! Delta modulation channel

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::{ApuChannel, Output};
use crate::clock_domain::NTSC;
use crate::mixer::{ChannelId, Mixer};
use crate::sample_memory::{SampleMemory, SAMPLE_MEMORY_START};

const MAX_DELTA: u8 = 0x7f;

#[derive(Debug, Clone, PartialEq)]
pub struct Dpcm {
    output: Output,
    memory: SampleMemory,

    period_table: &'static [u16; 16],
    rate_index: u8,
    counter: u32,

    irq_enabled: bool,
    irq_flag: bool,
    looping: bool,

    sample_address: u16,
    sample_length: u16,

    current_address: u16,
    bytes_remaining: u16,
    sample_buffer: Option<u8>,

    shift_register: u8,
    bits_remaining: u8,
    silence: bool,

    delta_counter: u8,
}

impl Dpcm {
    pub(crate) fn new() -> Self {
        Self {
            output: Output::new(ChannelId::Dpcm),
            memory: SampleMemory::new(),
            period_table: NTSC.dmc_periods,
            rate_index: 0,
            counter: u32::from(NTSC.dmc_periods[0]),
            irq_enabled: false,
            irq_flag: false,
            looping: false,
            sample_address: SAMPLE_MEMORY_START,
            sample_length: 1,
            current_address: SAMPLE_MEMORY_START,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            delta_counter: 0,
        }
    }

    pub(crate) fn set_period_table(&mut self, table: &'static [u16; 16]) {
        self.period_table = table;
    }

    pub(crate) fn memory_mut(&mut self) -> &mut SampleMemory {
        &mut self.memory
    }

    pub fn memory(&self) -> &SampleMemory {
        &self.memory
    }

    pub fn timer_period(&self) -> u16 {
        self.period_table[usize::from(self.rate_index)]
    }

    /// Number of sample bytes read since the sample was (re)started.
    pub fn sample_position(&self) -> u16 {
        self.current_address.wrapping_sub(self.sample_address)
    }

    pub fn delta_counter(&self) -> u8 {
        self.delta_counter
    }

    pub fn is_playing(&self) -> bool {
        self.bytes_remaining > 0
    }

    pub fn did_irq(&self) -> bool {
        self.irq_flag
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    fn fetch_sample_byte(&mut self) {
        if self.sample_buffer.is_some() || self.bytes_remaining == 0 {
            return;
        }

        self.sample_buffer = Some(self.memory.read(self.current_address));

        self.current_address = self.current_address.wrapping_add(1) | 0x8000;
        self.bytes_remaining -= 1;

        if self.bytes_remaining == 0 {
            if self.looping {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    fn clock_output_unit(&mut self) {
        if !self.silence {
            if self.shift_register & 1 != 0 {
                if self.delta_counter <= MAX_DELTA - 2 {
                    self.delta_counter += 2;
                }
            } else if self.delta_counter >= 2 {
                self.delta_counter -= 2;
            }
        }
        self.shift_register >>= 1;

        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;

            match self.sample_buffer.take() {
                Some(b) => {
                    self.shift_register = b;
                    self.silence = false;
                }
                None => self.silence = true,
            }
            self.fetch_sample_byte();
        }
    }
}

impl ApuChannel for Dpcm {
    fn reset(&mut self) {
        let table = self.period_table;
        let memory = std::mem::take(&mut self.memory);

        *self = Self::new();
        self.period_table = table;
        self.counter = u32::from(self.timer_period());
        self.memory = memory;
    }

    fn write(&mut self, sub_register: u8, value: u8) {
        match sub_register {
            0 => {
                self.irq_enabled = value & 0x80 != 0;
                self.looping = value & 0x40 != 0;
                self.rate_index = value & 0x0f;

                if !self.irq_enabled {
                    self.irq_flag = false;
                }
            }
            1 => {
                self.delta_counter = value & MAX_DELTA;
            }
            2 => {
                self.sample_address = SAMPLE_MEMORY_START | (u16::from(value) << 6);
            }
            3 => {
                self.sample_length = (u16::from(value) << 4) | 1;
            }
            _ => unreachable!("invalid DPCM sub-register {sub_register}"),
        }
    }

    fn write_control(&mut self, value: u8) {
        self.irq_flag = false;

        if value & 1 != 0 {
            if self.bytes_remaining == 0 {
                self.restart_sample();
                self.fetch_sample_byte();
            }
        } else {
            self.bytes_remaining = 0;
        }
    }

    fn read_control(&self) -> bool {
        self.bytes_remaining > 0
    }

    fn period(&self) -> u32 {
        self.counter
    }

    fn process<M: Mixer>(&mut self, cycles: u32, mixer: &mut M) {
        let mut cycles = cycles;

        // Direct loads take effect immediately
        self.output.mix(self.delta_counter, mixer);

        while cycles >= self.counter {
            cycles -= self.counter;
            self.output.advance(self.counter);
            self.counter = u32::from(self.timer_period());

            self.clock_output_unit();
            self.output.mix(self.delta_counter, mixer);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::NullMixer;

    #[test]
    fn address_and_length_registers() {
        let mut dpcm = Dpcm::new();
        dpcm.write(2, 0x01);
        dpcm.write(3, 0x02);

        assert_eq!(dpcm.sample_address, 0xc040);
        assert_eq!(dpcm.sample_length, 0x21);
    }

    #[test]
    fn direct_load_is_7_bit() {
        let mut dpcm = Dpcm::new();
        dpcm.write(1, 0xff);
        assert_eq!(dpcm.delta_counter(), 0x7f);
    }

    #[test]
    fn enable_restarts_only_when_finished() {
        let mut dpcm = Dpcm::new();
        dpcm.memory_mut().set_mem(&[0xff; 64]);
        dpcm.write(3, 0x01); // 17 bytes

        dpcm.write_control(1);
        assert!(dpcm.is_playing());
        assert_eq!(dpcm.sample_position(), 1);
        assert_eq!(dpcm.bytes_remaining, 16);

        dpcm.write_control(1);
        assert_eq!(dpcm.bytes_remaining, 16);

        dpcm.write_control(0);
        assert!(!dpcm.is_playing());
    }

    #[test]
    fn output_level_clamps() {
        let mut dpcm = Dpcm::new();
        dpcm.memory_mut().set_mem(&[0xff]);
        dpcm.write(0, 0x4f); // loop, fastest rate
        dpcm.write(1, 0x7c);
        dpcm.write_control(1);

        let mut mixer = NullMixer;
        dpcm.process(54 * 32, &mut mixer);

        assert_eq!(dpcm.delta_counter(), 0x7e);
        assert!(dpcm.is_playing());
    }

    #[test]
    fn irq_at_sample_end() {
        let mut dpcm = Dpcm::new();
        dpcm.memory_mut().set_mem(&[0x00]);
        dpcm.write(0, 0x8f);
        dpcm.write(3, 0x00); // 1 byte
        dpcm.write_control(1);

        assert!(!dpcm.is_playing());
        assert!(dpcm.did_irq());

        dpcm.write_control(0);
        assert!(!dpcm.did_irq());
    }
}
