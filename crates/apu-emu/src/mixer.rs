//! Mixer collaborator

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelId {
    Pulse1,
    Pulse2,
    Triangle,
    Noise,
    Dpcm,
}

impl ChannelId {
    pub const ALL: [ChannelId; N_CHANNELS] = [
        ChannelId::Pulse1,
        ChannelId::Pulse2,
        ChannelId::Triangle,
        ChannelId::Noise,
        ChannelId::Dpcm,
    ];

    pub fn as_index(self) -> usize {
        match self {
            ChannelId::Pulse1 => 0,
            ChannelId::Pulse2 => 1,
            ChannelId::Triangle => 2,
            ChannelId::Noise => 3,
            ChannelId::Dpcm => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelId::Pulse1 => "Pulse 1",
            ChannelId::Pulse2 => "Pulse 2",
            ChannelId::Triangle => "Triangle",
            ChannelId::Noise => "Noise",
            ChannelId::Dpcm => "DPCM",
        }
    }
}

pub const N_CHANNELS: usize = 5;

/// Receives the output level changes of the channel generators.
///
/// Sample synthesis (band-limiting, resampling, filtering) is the responsibility of the
/// implementor.
pub trait Mixer {
    fn set_clock_rate(&mut self, rate: u32);

    /// `frame_time` is the number of master clock cycles since the last `Apu::end_frame()`.
    fn add_value(&mut self, channel: ChannelId, level: u8, frame_time: u32);
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NullMixer;

impl Mixer for NullMixer {
    fn set_clock_rate(&mut self, _rate: u32) {}

    fn add_value(&mut self, _channel: ChannelId, _level: u8, _frame_time: u32) {}
}

/// Records the latest output level of each channel.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LevelMixer {
    clock_rate: u32,
    levels: [u8; N_CHANNELS],
    level_changes: [u32; N_CHANNELS],
    last_frame_time: u32,
}

impl LevelMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn level(&self, channel: ChannelId) -> u8 {
        self.levels[channel.as_index()]
    }

    pub fn level_changes(&self, channel: ChannelId) -> u32 {
        self.level_changes[channel.as_index()]
    }

    pub fn last_frame_time(&self) -> u32 {
        self.last_frame_time
    }

    pub fn clear_counters(&mut self) {
        self.level_changes = [0; N_CHANNELS];
        self.last_frame_time = 0;
    }
}

impl Mixer for LevelMixer {
    fn set_clock_rate(&mut self, rate: u32) {
        self.clock_rate = rate;
    }

    fn add_value(&mut self, channel: ChannelId, level: u8, frame_time: u32) {
        let i = channel.as_index();

        self.levels[i] = level;
        self.level_changes[i] = self.level_changes[i].wrapping_add(1);
        self.last_frame_time = frame_time;
    }
}
