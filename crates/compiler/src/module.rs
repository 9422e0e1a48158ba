//! Validated module data

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::channel_map::{ChannelId, ChannelMap};
use crate::notes::MidiNote;
use crate::rows::{ChanNote, InstrumentId, EMPTY_ROW};
use crate::sound_chips::{SoundChip, SoundChipSet};

use std::collections::BTreeMap;

use relative_path::RelativePathBuf;
use serde::Deserialize;

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Machine {
    #[default]
    Ntsc,
    Pal,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstrumentType {
    #[serde(rename = "2A03")]
    Apu,
    #[serde(rename = "VRC6")]
    Vrc6,
    #[serde(rename = "VRC7")]
    Vrc7,
    #[serde(rename = "FDS")]
    Fds,
    #[serde(rename = "N163")]
    N163,
    #[serde(rename = "S5B")]
    S5b,
}

/// Returns true if an instrument of type `inst_type` can be played on a `chip` channel
pub fn is_instrument_compatible(chip: SoundChip, inst_type: InstrumentType) -> bool {
    match chip {
        SoundChip::Apu | SoundChip::Mmc5 | SoundChip::Vrc6 | SoundChip::N163 | SoundChip::S5b => {
            matches!(
                inst_type,
                InstrumentType::Apu
                    | InstrumentType::Vrc6
                    | InstrumentType::N163
                    | InstrumentType::S5b
            )
        }
        SoundChip::Fds => inst_type == InstrumentType::Fds,
        SoundChip::Vrc7 => inst_type == InstrumentType::Vrc7,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DpcmAssignment {
    pub sample: u8,
    pub pitch: u8,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub inst_type: InstrumentType,
    pub name: String,
    pub dpcm: BTreeMap<MidiNote, DpcmAssignment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DpcmSample {
    pub name: String,
    pub source: RelativePathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Groove {
    pub id: u8,
    pub entries: Vec<u8>,
}

impl Groove {
    /// Size of the groove in the playback driver's groove table
    pub fn compiled_size(&self) -> usize {
        self.entries.len() + 2
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pattern {
    pub rows: Vec<ChanNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongChannel {
    pub channel: ChannelId,
    pub effect_columns: usize,
    pub patterns: BTreeMap<u8, Pattern>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: String,
    pub pattern_length: usize,
    pub speed: u8,
    /// 0 disables tempo
    pub tempo: u8,

    pub(crate) frames: Vec<Vec<u8>>,
    pub(crate) channels: Vec<SongChannel>,
}

impl Song {
    /// Pattern index for each channel, for each frame
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn channels(&self) -> &[SongChannel] {
        &self.channels
    }

    pub fn channel(&self, channel: ChannelId) -> Option<&SongChannel> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    /// Unused patterns and rows past the end of a pattern are empty
    pub fn row<'r>(&self, channel: &'r SongChannel, pattern: u8, row: usize) -> &'r ChanNote {
        channel
            .patterns
            .get(&pattern)
            .and_then(|p| p.rows.get(row))
            .unwrap_or(&EMPTY_ROW)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub machine: Machine,
    pub linear_pitch: bool,
    pub speed_split_point: u8,

    pub(crate) channel_map: ChannelMap,
    pub(crate) instruments: Vec<Option<Instrument>>,
    pub(crate) dpcm_samples: Vec<DpcmSample>,
    pub(crate) grooves: Vec<Option<Groove>>,
    pub(crate) songs: Vec<Song>,
}

impl Module {
    pub fn chips(&self) -> SoundChipSet {
        self.channel_map.chips()
    }

    pub fn channel_map(&self) -> &ChannelMap {
        &self.channel_map
    }

    pub fn instrument(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.get(id.as_usize()).and_then(Option::as_ref)
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().flatten()
    }

    pub fn n_instruments(&self) -> usize {
        self.instruments().count()
    }

    pub fn dpcm_samples(&self) -> &[DpcmSample] {
        &self.dpcm_samples
    }

    pub fn groove(&self, id: usize) -> Option<&Groove> {
        self.grooves.get(id).and_then(Option::as_ref)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn song(&self, track: usize) -> Option<&Song> {
        self.songs.get(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_compatibility() {
        assert!(is_instrument_compatible(SoundChip::Apu, InstrumentType::Apu));
        assert!(is_instrument_compatible(SoundChip::Mmc5, InstrumentType::Vrc6));
        assert!(is_instrument_compatible(SoundChip::N163, InstrumentType::S5b));
        assert!(!is_instrument_compatible(SoundChip::Apu, InstrumentType::Fds));
        assert!(!is_instrument_compatible(SoundChip::Apu, InstrumentType::Vrc7));

        assert!(is_instrument_compatible(SoundChip::Fds, InstrumentType::Fds));
        assert!(!is_instrument_compatible(SoundChip::Fds, InstrumentType::Apu));
        assert!(is_instrument_compatible(SoundChip::Vrc7, InstrumentType::Vrc7));
        assert!(!is_instrument_compatible(SoundChip::Vrc7, InstrumentType::N163));
    }

    #[test]
    fn groove_size() {
        let g = Groove {
            id: 0,
            entries: vec![6, 5],
        };
        assert_eq!(g.compiled_size(), 4);
    }
}
