//! JSON Data

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::channel_map::ChannelMap;
use crate::driver_constants::{
    DEFAULT_SPEED_SPLIT_POINT, MAX_DPCM_SAMPLES, MAX_EFFECT_COLUMNS, MAX_FRAMES, MAX_GROOVES,
    MAX_GROOVE_ENTRIES, MAX_INSTRUMENTS, MAX_N163_CHANNELS, MAX_PATTERNS, MAX_PATTERN_LENGTH,
};
use crate::errors::{DeserializeError, ModuleError, ModuleErrors, SongError, ValueError};
use crate::module::{
    DpcmAssignment, DpcmSample, Groove, Instrument, InstrumentType, Machine, Module, Pattern,
    Song, SongChannel,
};
use crate::notes::MidiNote;
use crate::rows::{ChanNote, InstrumentId};
use crate::sound_chips::{SoundChip, SoundChipSet};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use relative_path::RelativePathBuf;
use serde::Deserialize;

fn default_speed_split_point() -> u8 {
    DEFAULT_SPEED_SPLIT_POINT
}

fn default_n163_channels() -> u32 {
    1
}

fn default_speed() -> u32 {
    6
}

fn default_tempo() -> u32 {
    150
}

fn default_effect_columns() -> u32 {
    1
}

fn default_dpcm_pitch() -> u32 {
    15
}

#[derive(Deserialize, Debug)]
pub struct DpcmAssignmentData {
    pub note: String,
    pub sample: u32,

    #[serde(default = "default_dpcm_pitch")]
    pub pitch: u32,

    #[serde(default, rename = "loop")]
    pub looping: bool,
}

#[derive(Deserialize, Debug)]
pub struct InstrumentData {
    pub id: u32,

    #[serde(rename = "type")]
    pub inst_type: InstrumentType,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub dpcm: Vec<DpcmAssignmentData>,
}

#[derive(Deserialize, Debug)]
pub struct DpcmSampleData {
    pub name: String,
    pub source: RelativePathBuf,
}

#[derive(Deserialize, Debug)]
pub struct GrooveData {
    pub id: u32,
    pub entries: Vec<u8>,
}

#[derive(Deserialize, Debug)]
pub struct ChannelData {
    #[serde(default = "default_effect_columns")]
    pub effect_columns: u32,

    // Pattern index => rows
    #[serde(default)]
    pub patterns: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize, Debug)]
pub struct SongData {
    #[serde(default)]
    pub name: String,

    pub pattern_length: u32,

    #[serde(default = "default_speed")]
    pub speed: u32,

    #[serde(default = "default_tempo")]
    pub tempo: u32,

    pub frames: Vec<Vec<u32>>,
    pub channels: Vec<ChannelData>,
}

#[derive(Deserialize, Debug)]
pub struct ModuleData {
    #[serde(default)]
    pub machine: Machine,

    #[serde(default)]
    pub chips: Vec<SoundChip>,

    #[serde(default = "default_n163_channels")]
    pub n163_channels: u32,

    #[serde(default)]
    pub linear_pitch: bool,

    #[serde(default = "default_speed_split_point")]
    pub speed_split_point: u8,

    #[serde(default)]
    pub instruments: Vec<InstrumentData>,

    #[serde(default)]
    pub dpcm_samples: Vec<DpcmSampleData>,

    #[serde(default)]
    pub grooves: Vec<GrooveData>,

    pub songs: Vec<SongData>,
}

pub struct ModuleFile {
    pub path: PathBuf,
    pub file_name: String,
    pub parent_path: PathBuf,

    pub module: ModuleData,
}

pub fn load_module_file(path: PathBuf) -> Result<ModuleFile, DeserializeError> {
    let file_name = path
        .file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string();

    let parent_path = match path.parent() {
        Some(p) => p.to_owned(),
        None => return Err(DeserializeError::NoParentPath(file_name)),
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => return Err(DeserializeError::OpenError(file_name, e)),
    };
    let reader = BufReader::new(file);

    let module = match serde_json::from_reader(reader) {
        Ok(m) => m,
        Err(e) => return Err(DeserializeError::SerdeError(file_name, e)),
    };

    Ok(ModuleFile {
        path,
        file_name,
        parent_path,
        module,
    })
}

fn validate_instruments(
    data: Vec<InstrumentData>,
    n_dpcm_samples: usize,
    add_error: &mut impl FnMut(ModuleError),
) -> Vec<Option<Instrument>> {
    let mut out = vec![None; MAX_INSTRUMENTS];

    for inst in data {
        let id = match InstrumentId::try_from(inst.id) {
            Ok(id) => id,
            Err(e) => {
                add_error(ModuleError::InvalidInstrumentId(e));
                continue;
            }
        };
        let id_u8 = id.as_u8();

        if out[id.as_usize()].is_some() {
            add_error(ModuleError::DuplicateInstrumentId(id_u8));
            continue;
        }

        if !inst.dpcm.is_empty() && inst.inst_type != InstrumentType::Apu {
            add_error(ModuleError::DpcmOnNon2a03Instrument(id_u8));
        }

        let mut dpcm = BTreeMap::new();
        for a in inst.dpcm {
            let note = match MidiNote::parse(&a.note) {
                Ok(n) => n,
                Err(error) => {
                    add_error(ModuleError::DpcmNote {
                        instrument: id_u8,
                        error,
                    });
                    continue;
                }
            };

            let sample = match u8::try_from(a.sample) {
                Ok(s) if usize::from(s) < n_dpcm_samples => s,
                _ => {
                    add_error(ModuleError::DpcmAssignment {
                        instrument: id_u8,
                        note,
                        error: ValueError::DpcmSampleOutOfRange(a.sample),
                    });
                    continue;
                }
            };

            let pitch = match u8::try_from(a.pitch) {
                Ok(p) if p <= 0x0f => p,
                _ => {
                    add_error(ModuleError::DpcmAssignment {
                        instrument: id_u8,
                        note,
                        error: ValueError::DpcmPitchOutOfRange(a.pitch),
                    });
                    continue;
                }
            };

            let assignment = DpcmAssignment {
                sample,
                pitch,
                looping: a.looping,
            };
            if dpcm.insert(note, assignment).is_some() {
                add_error(ModuleError::DuplicateDpcmNote {
                    instrument: id_u8,
                    note,
                });
            }
        }

        out[id.as_usize()] = Some(Instrument {
            id,
            inst_type: inst.inst_type,
            name: inst.name,
            dpcm,
        });
    }

    out
}

fn validate_grooves(
    data: Vec<GrooveData>,
    add_error: &mut impl FnMut(ModuleError),
) -> Vec<Option<Groove>> {
    let mut out = vec![None; MAX_GROOVES];

    for g in data {
        let id = match usize::try_from(g.id) {
            Ok(id) if id < MAX_GROOVES => id,
            _ => {
                add_error(ModuleError::InvalidGrooveId(ValueError::GrooveIdOutOfRange(
                    g.id,
                )));
                continue;
            }
        };
        let id_u8 = id as u8;

        if out[id].is_some() {
            add_error(ModuleError::DuplicateGrooveId(id_u8));
            continue;
        }
        if g.entries.is_empty() || g.entries.len() > MAX_GROOVE_ENTRIES {
            add_error(ModuleError::InvalidGrooveSize {
                groove: id_u8,
                size: g.entries.len(),
            });
            continue;
        }
        if g.entries.contains(&0) {
            add_error(ModuleError::GrooveEntryZero(id_u8));
            continue;
        }

        out[id] = Some(Groove {
            id: id_u8,
            entries: g.entries,
        });
    }

    out
}

fn validate_song(
    data: SongData,
    channel_map: &ChannelMap,
    add_error: &mut impl FnMut(SongError),
) -> Song {
    let pattern_length = match usize::try_from(data.pattern_length) {
        Ok(l) if l > 0 && l <= MAX_PATTERN_LENGTH => l,
        _ => {
            add_error(SongError::PatternLengthOutOfRange(data.pattern_length));
            1
        }
    };

    let speed = match u8::try_from(data.speed) {
        Ok(s) if s > 0 => s,
        _ => {
            add_error(SongError::SpeedOutOfRange(data.speed));
            1
        }
    };

    let tempo = match u8::try_from(data.tempo) {
        Ok(t) => t,
        Err(_) => {
            add_error(SongError::TempoOutOfRange(data.tempo));
            0
        }
    };

    if data.channels.len() != channel_map.len() {
        add_error(SongError::WrongNumberOfChannels {
            expected: channel_map.len(),
            found: data.channels.len(),
        });
    }

    if data.frames.is_empty() {
        add_error(SongError::NoFrames);
    }
    if data.frames.len() > MAX_FRAMES {
        add_error(SongError::TooManyFrames(data.frames.len()));
    }

    let mut frames = Vec::with_capacity(data.frames.len());
    for (frame_index, frame) in data.frames.iter().enumerate() {
        if frame.len() != channel_map.len() {
            add_error(SongError::FrameWrongNumberOfChannels {
                frame: frame_index,
                expected: channel_map.len(),
                found: frame.len(),
            });
        }

        let f = channel_map
            .channels()
            .iter()
            .zip(frame)
            .map(|(&channel, &p)| match u8::try_from(p) {
                Ok(p) => p,
                Err(_) => {
                    add_error(SongError::FramePatternOutOfRange {
                        frame: frame_index,
                        channel,
                        pattern: p,
                    });
                    0
                }
            })
            .collect();
        frames.push(f);
    }

    let mut channels = Vec::with_capacity(channel_map.len());
    for (&channel, c) in channel_map.channels().iter().zip(data.channels) {
        let effect_columns = match usize::try_from(c.effect_columns) {
            Ok(n) if n > 0 && n <= MAX_EFFECT_COLUMNS => n,
            _ => {
                add_error(SongError::EffectColumnsOutOfRange {
                    channel,
                    columns: c.effect_columns,
                });
                1
            }
        };

        let mut patterns = BTreeMap::new();
        for (index, rows) in c.patterns {
            let pattern = match index.parse::<usize>() {
                Ok(i) if i < MAX_PATTERNS => i as u8,
                _ => {
                    add_error(SongError::InvalidPatternIndex { channel, index });
                    continue;
                }
            };
            if rows.len() > pattern_length {
                add_error(SongError::TooManyRows {
                    channel,
                    pattern,
                    rows: rows.len(),
                });
            }

            let mut p = Pattern::default();
            for (row, text) in rows.iter().enumerate() {
                match ChanNote::parse(text, channel.chip) {
                    Ok(n) => p.rows.push(n),
                    Err(error) => {
                        add_error(SongError::Row {
                            channel,
                            pattern,
                            row,
                            error,
                        });
                        p.rows.push(ChanNote::default());
                    }
                }
            }
            patterns.insert(pattern, p);
        }

        channels.push(SongChannel {
            channel,
            effect_columns,
            patterns,
        });
    }

    Song {
        name: data.name,
        pattern_length,
        speed,
        tempo,
        frames,
        channels,
    }
}

pub fn validate_module(data: ModuleData) -> Result<Module, ModuleErrors> {
    let mut errors = Vec::new();

    let chips = SoundChipSet::from_chips(&data.chips);

    let n163_channels = match u8::try_from(data.n163_channels) {
        Ok(n) if n > 0 && n <= MAX_N163_CHANNELS => n,
        _ => {
            errors.push(ModuleError::N163ChannelsOutOfRange(data.n163_channels));
            1
        }
    };
    let channel_map = ChannelMap::new(chips, n163_channels);

    if data.dpcm_samples.len() > MAX_DPCM_SAMPLES {
        errors.push(ModuleError::TooManyDpcmSamples(data.dpcm_samples.len()));
    }
    let dpcm_samples: Vec<DpcmSample> = data
        .dpcm_samples
        .into_iter()
        .map(|s| DpcmSample {
            name: s.name,
            source: s.source,
        })
        .collect();

    let instruments = validate_instruments(data.instruments, dpcm_samples.len(), &mut |e| {
        errors.push(e)
    });
    let grooves = validate_grooves(data.grooves, &mut |e| errors.push(e));

    if data.songs.is_empty() {
        errors.push(ModuleError::NoSongs);
    }

    let songs = data
        .songs
        .into_iter()
        .enumerate()
        .map(|(index, s)| {
            let name = s.name.clone();
            validate_song(s, &channel_map, &mut |error| {
                errors.push(ModuleError::Song {
                    index,
                    name: name.clone(),
                    error,
                })
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(Module {
            machine: data.machine,
            linear_pitch: data.linear_pitch,
            speed_split_point: data.speed_split_point,
            channel_map,
            instruments,
            dpcm_samples,
            grooves,
            songs,
        })
    } else {
        Err(ModuleErrors(errors))
    }
}

impl TryFrom<ModuleFile> for Module {
    type Error = ModuleErrors;

    fn try_from(file: ModuleFile) -> Result<Self, Self::Error> {
        validate_module(file.module)
    }
}

/// Parses and validates a module JSON string
pub fn parse_module_json(json: &str) -> Result<Module, String> {
    let data: ModuleData = serde_json::from_str(json).map_err(|e| e.to_string())?;
    validate_module(data).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_map::ChannelId;
    use crate::errors::RowError;
    use crate::notes::Note;

    const SIMPLE_MODULE: &str = r##"{
        "chips": ["2A03"],
        "instruments": [
            { "id": 0, "type": "2A03", "name": "lead" },
            { "id": 5, "type": "2A03", "name": "drums",
              "dpcm": [ { "note": "C-3", "sample": 0, "pitch": 15, "loop": false } ] }
        ],
        "dpcm_samples": [ { "name": "kick", "source": "kick.dmc" } ],
        "grooves": [ { "id": 1, "entries": [6, 5] } ],
        "songs": [{
            "name": "Song",
            "pattern_length": 4,
            "frames": [ [0, 0, 0, 0, 0] ],
            "channels": [
                { "effect_columns": 2, "patterns": { "0": [ "C-4 00 F 4A3", "", "--- .. ." ] } },
                { "patterns": {} },
                { "patterns": {} },
                { "patterns": { "0": [ "5-# .. 8" ] } },
                { "patterns": { "0": [ "C-3 05 ." ] } }
            ]
        }]
    }"##;

    fn load(json: &str) -> Result<Module, ModuleErrors> {
        let data: ModuleData = serde_json::from_str(json).unwrap();
        validate_module(data)
    }

    #[test]
    fn load_simple_module() {
        let m = load(SIMPLE_MODULE).unwrap();

        assert_eq!(m.chips(), SoundChipSet::APU_ONLY);
        assert_eq!(m.speed_split_point, 32);
        assert_eq!(m.n_instruments(), 2);
        assert_eq!(m.groove(1).map(|g| g.compiled_size()), Some(4));
        assert!(m.groove(0).is_none());

        let drums = m.instrument(InstrumentId::try_from(5u8).unwrap()).unwrap();
        assert_eq!(drums.dpcm.len(), 1);

        let song = m.song(0).unwrap();
        assert_eq!(song.pattern_length, 4);
        assert_eq!(song.speed, 6);
        assert_eq!(song.tempo, 150);

        let pulse1 = song.channel(ChannelId::apu(0)).unwrap();
        assert_eq!(pulse1.effect_columns, 2);
        assert_eq!(song.row(pulse1, 0, 2).note, Note::Halt);
        assert!(!song.row(pulse1, 0, 1).is_used(2));
        assert!(!song.row(pulse1, 0, 3).is_used(2));
        assert!(!song.row(pulse1, 9, 0).is_used(2));
    }

    #[test]
    fn collects_errors() {
        let json = r##"{
            "instruments": [
                { "id": 64, "type": "2A03" },
                { "id": 1, "type": "VRC6", "dpcm": [ { "note": "C-3", "sample": 2 } ] },
                { "id": 1, "type": "2A03" }
            ],
            "songs": [{
                "pattern_length": 2,
                "frames": [ [0, 0, 0, 0] ],
                "channels": [
                    { "patterns": { "0": [ "C-4 00 F", "X-4 .. ." ] } },
                    {}, {}, {}, {}
                ]
            }]
        }"##;

        let errors = load(json).unwrap_err().0;

        assert!(matches!(
            errors[0],
            ModuleError::InvalidInstrumentId(ValueError::InstrumentIdOutOfRange(64))
        ));
        assert!(matches!(errors[1], ModuleError::DpcmOnNon2a03Instrument(1)));
        assert!(matches!(
            errors[2],
            ModuleError::DpcmAssignment {
                instrument: 1,
                error: ValueError::DpcmSampleOutOfRange(2),
                ..
            }
        ));
        assert!(matches!(errors[3], ModuleError::DuplicateInstrumentId(1)));
        assert!(matches!(
            errors[4],
            ModuleError::Song {
                error: SongError::FrameWrongNumberOfChannels { .. },
                ..
            }
        ));
        assert!(matches!(
            &errors[5],
            ModuleError::Song {
                error: SongError::Row {
                    row: 1,
                    error: RowError::Note(_),
                    ..
                },
                ..
            }
        ));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn wrong_number_of_channels() {
        let json = r##"{
            "chips": ["2A03", "VRC6"],
            "songs": [{ "pattern_length": 2, "frames": [], "channels": [ {}, {}, {}, {}, {} ] }]
        }"##;

        let errors = load(json).unwrap_err().0;
        assert!(matches!(
            errors[0],
            ModuleError::Song {
                error: SongError::WrongNumberOfChannels {
                    expected: 8,
                    found: 5
                },
                ..
            }
        ));
        assert!(matches!(
            errors[1],
            ModuleError::Song {
                error: SongError::NoFrames,
                ..
            }
        ));
    }
}
