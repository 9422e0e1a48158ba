//! Channel map

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::MAX_N163_CHANNELS;
use crate::sound_chips::{SoundChip, SoundChipSet};

use std::fmt::Display;

pub mod apu {
    pub const PULSE1: u8 = 0;
    pub const PULSE2: u8 = 1;
    pub const TRIANGLE: u8 = 2;
    pub const NOISE: u8 = 3;
    pub const DPCM: u8 = 4;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub chip: SoundChip,
    pub subindex: u8,
}

impl ChannelId {
    pub const fn new(chip: SoundChip, subindex: u8) -> Self {
        Self { chip, subindex }
    }

    pub const fn apu(subindex: u8) -> Self {
        Self::new(SoundChip::Apu, subindex)
    }

    pub fn is_dpcm(&self) -> bool {
        *self == Self::apu(apu::DPCM)
    }

    pub fn is_apu_pulse(&self) -> bool {
        self.chip == SoundChip::Apu && matches!(self.subindex, apu::PULSE1 | apu::PULSE2)
    }

    pub fn is_apu_triangle(&self) -> bool {
        *self == Self::apu(apu::TRIANGLE)
    }

    pub fn is_apu_noise(&self) -> bool {
        *self == Self::apu(apu::NOISE)
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.subindex + 1;

        match self.chip {
            SoundChip::Apu => match self.subindex {
                apu::PULSE1 | apu::PULSE2 => write!(f, "Pulse {n}"),
                apu::TRIANGLE => write!(f, "Triangle"),
                apu::NOISE => write!(f, "Noise"),
                _ => write!(f, "DPCM"),
            },
            SoundChip::Vrc6 => match self.subindex {
                0 | 1 => write!(f, "VRC6 Pulse {n}"),
                _ => write!(f, "Sawtooth"),
            },
            SoundChip::Mmc5 => write!(f, "MMC5 Pulse {n}"),
            SoundChip::N163 => write!(f, "Namco {n}"),
            SoundChip::Fds => write!(f, "FDS"),
            SoundChip::Vrc7 => write!(f, "FM Channel {n}"),
            SoundChip::S5b => write!(f, "5B Square {n}"),
        }
    }
}

fn chip_channel_count(chip: SoundChip, n163_channels: u8) -> u8 {
    match chip {
        SoundChip::Apu => 5,
        SoundChip::Vrc6 => 3,
        SoundChip::Mmc5 => 2,
        SoundChip::N163 => n163_channels.clamp(1, MAX_N163_CHANNELS),
        SoundChip::Fds => 1,
        SoundChip::Vrc7 => 6,
        SoundChip::S5b => 3,
    }
}

// Tracker column order
const CHIP_ORDER: [SoundChip; 7] = [
    SoundChip::Apu,
    SoundChip::Vrc6,
    SoundChip::Mmc5,
    SoundChip::N163,
    SoundChip::Fds,
    SoundChip::Vrc7,
    SoundChip::S5b,
];

/// The ordered list of channels provided by a sound chip set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMap {
    chips: SoundChipSet,
    channels: Vec<ChannelId>,
}

impl ChannelMap {
    pub fn new(chips: SoundChipSet, n163_channels: u8) -> Self {
        let channels = CHIP_ORDER
            .iter()
            .filter(|&&c| chips.contains(c))
            .flat_map(|&c| (0..chip_channel_count(c, n163_channels)).map(move |i| ChannelId::new(c, i)))
            .collect();

        Self { chips, channels }
    }

    pub fn chips(&self) -> SoundChipSet {
        self.chips
    }

    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ChannelId> {
        self.channels.get(index).copied()
    }

    pub fn channel_index(&self, channel: ChannelId) -> Option<usize> {
        self.channels.iter().position(|&c| c == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apu_only() {
        let map = ChannelMap::new(SoundChipSet::APU_ONLY, 0);

        assert_eq!(map.len(), 5);
        assert!(map.get(4).is_some_and(|c| c.is_dpcm()));
        assert_eq!(map.channel_index(ChannelId::apu(apu::NOISE)), Some(3));
        assert_eq!(map.channel_index(ChannelId::new(SoundChip::Vrc6, 0)), None);
    }

    #[test]
    fn expansion_order() {
        let chips = SoundChipSet::from_chips(&[SoundChip::S5b, SoundChip::N163, SoundChip::Vrc6]);
        let map = ChannelMap::new(chips, 2);

        let names: Vec<String> = map.channels().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            [
                "Pulse 1",
                "Pulse 2",
                "Triangle",
                "Noise",
                "DPCM",
                "VRC6 Pulse 1",
                "VRC6 Pulse 2",
                "Sawtooth",
                "Namco 1",
                "Namco 2",
                "5B Square 1",
                "5B Square 2",
                "5B Square 3",
            ]
        );
    }
}
