//! 2A03 APU

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::channels::{ApuChannel, Dpcm, Noise, Square, Triangle};
use crate::clock_domain::{ClockDomain, Machine};
use crate::mixer::{ChannelId, Mixer};
use crate::sample_memory::SampleMemory;

pub const FIRST_REGISTER: u16 = 0x4000;
pub const LAST_REGISTER: u16 = 0x401f;

const STATUS_REGISTER: u16 = 0x4015;
const FRAME_COUNTER_REGISTER: u16 = 0x4017;

/// Minimum number of cycles a timing domain is advanced by.
pub const MIN_SLICE_CYCLES: u32 = 7;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FrameMode {
    #[default]
    FourStep,
    FiveStep,
}

impl FrameMode {
    fn n_steps(self) -> u8 {
        match self {
            FrameMode::FourStep => 4,
            FrameMode::FiveStep => 5,
        }
    }
}

pub struct Apu<M: Mixer> {
    mixer: M,
    clock_domain: &'static ClockDomain,

    square1: Square,
    square2: Square,
    triangle: Triangle,
    noise: Noise,
    dpcm: Dpcm,

    frame_sequence: u8,
    frame_mode: FrameMode,
    frame_cycles_left: u32,
}

impl<M: Mixer> Apu<M> {
    pub fn new(mixer: M, machine: Machine) -> Self {
        let mut apu = Self {
            mixer,
            clock_domain: machine.clock_domain(),

            square1: Square::new(ChannelId::Pulse1),
            square2: Square::new(ChannelId::Pulse2),
            triangle: Triangle::new(),
            noise: Noise::new(),
            dpcm: Dpcm::new(),

            frame_sequence: 0,
            frame_mode: FrameMode::FourStep,
            frame_cycles_left: 0,
        };
        apu.set_clock_domain(machine);
        apu.reset();
        apu
    }

    pub fn reset(&mut self) {
        self.frame_sequence = 0;
        self.frame_mode = FrameMode::FourStep;
        self.frame_cycles_left = self.clock_domain.sequencer_period;

        self.square1.reset();
        self.square2.reset();
        self.triangle.reset();
        self.noise.reset();
        self.dpcm.reset();
    }

    pub fn set_clock_domain(&mut self, machine: Machine) {
        let cd = machine.clock_domain();

        self.clock_domain = cd;
        self.noise.set_period_table(cd.noise_periods);
        self.dpcm.set_period_table(cd.dmc_periods);
        self.frame_cycles_left = self.frame_cycles_left.min(cd.sequencer_period);

        self.mixer.set_clock_rate(cd.master_clock);
    }

    pub fn change_machine(&mut self, machine: Machine) {
        self.set_clock_domain(machine)
    }

    pub fn clock_domain(&self) -> &'static ClockDomain {
        self.clock_domain
    }

    pub fn machine(&self) -> Machine {
        self.clock_domain.machine
    }

    pub fn write_register(&mut self, address: u16, value: u8) {
        if !(FIRST_REGISTER..=LAST_REGISTER).contains(&address) {
            return;
        }

        match address {
            STATUS_REGISTER => {
                self.square1.write_control(value);
                self.square2.write_control(value >> 1);
                self.triangle.write_control(value >> 2);
                self.noise.write_control(value >> 3);
                self.dpcm.write_control(value >> 4);
            }
            FRAME_COUNTER_REGISTER => {
                self.frame_sequence = 0;

                if value & 0x80 != 0 {
                    self.frame_mode = FrameMode::FiveStep;
                    self.clock_240hz();
                    self.clock_120hz();
                    self.clock_60hz();
                } else {
                    self.frame_mode = FrameMode::FourStep;
                }
            }
            _ => {
                let sub_register = (address & 0x03) as u8;

                match address & 0x1c {
                    0x00 => self.square1.write(sub_register, value),
                    0x04 => self.square2.write(sub_register, value),
                    0x08 => self.triangle.write(sub_register, value),
                    0x0c => self.noise.write(sub_register, value),
                    0x10 => self.dpcm.write(sub_register, value),
                    _ => (),
                }
            }
        }
    }

    /// Returns `None` if the address is unmapped.
    pub fn read_register(&self, address: u16) -> Option<u8> {
        match address {
            STATUS_REGISTER => {
                let mut v = 0;
                v |= u8::from(self.square1.read_control());
                v |= u8::from(self.square2.read_control()) << 1;
                v |= u8::from(self.triangle.read_control()) << 2;
                v |= u8::from(self.noise.read_control()) << 3;
                v |= u8::from(self.dpcm.read_control()) << 4;
                v |= u8::from(self.dpcm.did_irq()) << 7;
                Some(v)
            }
            _ => None,
        }
    }

    /// Advance the emulator by `cycles` master clock cycles.
    pub fn advance(&mut self, cycles: u32) {
        let mut cycles = cycles;

        while cycles > 0 {
            let slice = cycles.min(self.frame_cycles_left);

            self.run_apu1(slice);
            self.run_apu2(slice);

            cycles -= slice;
            self.frame_cycles_left -= slice;

            if self.frame_cycles_left == 0 {
                self.frame_cycles_left = self.clock_domain.sequencer_period;
                self.clock_sequence();
            }
        }
    }

    pub fn process(&mut self, cycles: u32) {
        self.advance(cycles)
    }

    pub fn end_frame(&mut self) {
        self.square1.end_frame();
        self.square2.end_frame();
        self.triangle.end_frame();
        self.noise.end_frame();
        self.dpcm.end_frame();
    }

    pub fn frequency(&self, channel: ChannelId) -> f64 {
        let clock = self.clock_domain.master_clock;

        match channel {
            ChannelId::Pulse1 => self.square1.frequency(clock),
            ChannelId::Pulse2 => self.square2.frequency(clock),
            ChannelId::Triangle => self.triangle.frequency(clock),
            ChannelId::Noise => self.noise.frequency(clock),
            ChannelId::Dpcm => self.dpcm.frequency(clock),
        }
    }

    pub fn write_sample(&mut self, data: &[u8]) {
        self.dpcm.memory_mut().set_mem(data);
    }

    pub fn clear_sample(&mut self) {
        self.dpcm.memory_mut().clear();
    }

    pub fn sample_memory(&self) -> &SampleMemory {
        self.dpcm.memory()
    }

    pub fn sample_position(&self) -> u16 {
        self.dpcm.sample_position()
    }

    pub fn delta_counter(&self) -> u8 {
        self.dpcm.delta_counter()
    }

    pub fn dpcm_playing(&self) -> bool {
        self.dpcm.is_playing()
    }

    pub fn frame_sequence(&self) -> u8 {
        self.frame_sequence
    }

    pub fn frame_mode(&self) -> FrameMode {
        self.frame_mode
    }

    pub fn square1(&self) -> &Square {
        &self.square1
    }

    pub fn square2(&self) -> &Square {
        &self.square2
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    pub fn dpcm(&self) -> &Dpcm {
        &self.dpcm
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    pub fn into_mixer(self) -> M {
        self.mixer
    }

    fn clock_sequence(&mut self) {
        self.frame_sequence = (self.frame_sequence + 1) % self.frame_mode.n_steps();

        match (self.frame_mode, self.frame_sequence) {
            (FrameMode::FourStep, 0 | 2) => {
                self.clock_240hz();
            }
            (FrameMode::FourStep, 1) => {
                self.clock_240hz();
                self.clock_120hz();
            }
            (FrameMode::FourStep, _) => {
                self.clock_240hz();
                self.clock_120hz();
                self.clock_60hz();
            }
            (FrameMode::FiveStep, 0 | 2) => {
                self.clock_240hz();
                self.clock_120hz();
            }
            (FrameMode::FiveStep, 1 | 3) => {
                self.clock_240hz();
            }
            (FrameMode::FiveStep, _) => (),
        }
    }

    fn clock_240hz(&mut self) {
        self.square1.clock_envelope();
        self.square2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    fn clock_120hz(&mut self) {
        self.square1.clock_sweep();
        self.square2.clock_sweep();

        self.square1.clock_length_counter();
        self.square2.clock_length_counter();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
    }

    fn clock_60hz(&mut self) {
        // Frame IRQ is not emulated
    }

    fn run_apu1(&mut self, cycles: u32) {
        let mut cycles = cycles;

        while cycles > 0 {
            let slice = self
                .square1
                .period()
                .min(self.square2.period())
                .max(MIN_SLICE_CYCLES)
                .min(cycles);

            self.square1.process(slice, &mut self.mixer);
            self.square2.process(slice, &mut self.mixer);

            cycles -= slice;
        }
    }

    fn run_apu2(&mut self, cycles: u32) {
        let mut cycles = cycles;

        while cycles > 0 {
            let slice = self
                .triangle
                .period()
                .min(self.noise.period())
                .min(self.dpcm.period())
                .max(MIN_SLICE_CYCLES)
                .min(cycles);

            self.triangle.process(slice, &mut self.mixer);
            self.noise.process(slice, &mut self.mixer);
            self.dpcm.process(slice, &mut self.mixer);

            cycles -= slice;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::NullMixer;

    fn ntsc_apu() -> Apu<NullMixer> {
        Apu::new(NullMixer, Machine::Ntsc)
    }

    #[test]
    fn frame_sequence_wraps_in_four_step_mode() {
        let mut apu = ntsc_apu();
        let period = apu.clock_domain().sequencer_period;

        for i in 1..=8 {
            apu.advance(period);
            assert_eq!(apu.frame_sequence(), i % 4);
        }
    }

    #[test]
    fn frame_sequence_wraps_in_five_step_mode() {
        let mut apu = ntsc_apu();
        apu.write_register(0x4017, 0x80);
        let period = apu.clock_domain().sequencer_period;

        for i in 1..=10 {
            apu.advance(period);
            assert_eq!(apu.frame_sequence(), i % 5);
        }
    }

    #[test]
    fn unmapped_reads() {
        let apu = ntsc_apu();

        assert_eq!(apu.read_register(0x4015), Some(0));
        assert_eq!(apu.read_register(0x4000), None);
        assert_eq!(apu.read_register(0x4017), None);
        assert_eq!(apu.read_register(0x3fff), None);
    }

    #[test]
    fn writes_outside_window_are_ignored() {
        let mut apu = ntsc_apu();
        apu.write_register(0x3fff, 0xff);
        apu.write_register(0x4020, 0xff);
        apu.write_register(0x0015, 0xff);

        assert_eq!(apu.read_register(0x4015), Some(0));
        assert_eq!(apu.frame_mode(), FrameMode::FourStep);
    }

    #[test]
    fn long_advance_without_end_frame() {
        let mut apu = ntsc_apu();
        apu.write_register(0x4015, 0x0f);

        // Long timer periods keep the slice count down
        for (address, value) in [
            (0x4002, 0xff),
            (0x4003, 0x07),
            (0x4006, 0xff),
            (0x4007, 0x07),
            (0x400a, 0xff),
            (0x400b, 0x07),
            (0x400e, 0x0f),
        ] {
            apu.write_register(address, value);
        }

        for _ in 0..3 {
            apu.advance(u32::MAX / 2);
        }
        assert!(apu.frame_sequence() < 4);
    }
}
