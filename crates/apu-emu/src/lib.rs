//! 2A03 APU emulator

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod apu;
mod sample_memory;

pub mod channels;
pub mod clock_domain;
pub mod mixer;

pub use apu::{Apu, FrameMode, FIRST_REGISTER, LAST_REGISTER, MIN_SLICE_CYCLES};
pub use clock_domain::{ClockDomain, Machine};
pub use mixer::{ChannelId, LevelMixer, Mixer, NullMixer};
pub use sample_memory::SampleMemory;
