//! Track exporter

// SPDX-FileCopyrightText: © 2024 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::stream::NOTE_ECHO;
use crate::driver_constants::{HOLD_INSTRUMENT, MAX_INSTRUMENTS, NO_INSTRUMENT};
use crate::errors::ExportError;
use crate::module::{DpcmAssignment, Module};
use crate::notes::{MidiNote, N_NOTES};
use crate::pattern_compiler::{CompiledPattern, PatternCompiler};
use crate::rows::{InstrumentId, RowInstrument};

use std::collections::HashMap;

/// Slot numbers are written as note indexes and cannot overlap the echo notes
pub const MAX_DPCM_SLOTS: usize = NOTE_ECHO as usize;

/// The instruments exported with a module, in instrument id order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentList(Vec<InstrumentId>);

impl InstrumentList {
    pub fn from_module(module: &Module) -> Self {
        Self(module.instruments().map(|i| i.id).collect())
    }

    pub fn from_ids(ids: Vec<InstrumentId>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[InstrumentId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the compacted instrument index.
    ///
    /// Instruments that are not in the list are compacted to 0.
    pub fn find(&self, instrument: RowInstrument) -> u8 {
        match instrument {
            RowInstrument::None => NO_INSTRUMENT,
            RowInstrument::Hold => HOLD_INSTRUMENT,
            RowInstrument::Index(id) => match self.0.iter().position(|&i| i == id) {
                Some(i) => i as u8,
                None => 0,
            },
        }
    }
}

/// DPCM sample slot for each instrument and note
#[derive(Debug, Clone)]
pub struct DpcmList {
    slots: Vec<DpcmAssignment>,
    table: Vec<[u8; N_NOTES]>,
}

impl DpcmList {
    /// Assigns a slot to every unique sample, pitch and loop combination
    pub fn from_module(module: &Module) -> Result<Self, ExportError> {
        let mut slots: Vec<DpcmAssignment> = Vec::new();
        let mut table = vec![[0; N_NOTES]; MAX_INSTRUMENTS];

        for inst in module.instruments() {
            for (note, assignment) in &inst.dpcm {
                let slot = match slots.iter().position(|s| s == assignment) {
                    Some(i) => i,
                    None => {
                        slots.push(*assignment);
                        slots.len() - 1
                    }
                };

                table[inst.id.as_usize()][note.as_usize()] = (slot + 1) as u8;
            }
        }

        if slots.len() > MAX_DPCM_SLOTS {
            return Err(ExportError::TooManyDpcmSlots(slots.len()));
        }

        Ok(Self { slots, table })
    }

    pub fn slots(&self) -> &[DpcmAssignment] {
        &self.slots
    }

    /// Returns the 1-based slot number (0 if the note has no sample)
    pub fn sample_slot(&self, instrument: InstrumentId, note: MidiNote) -> u8 {
        self.table[instrument.as_usize()][note.as_usize()]
    }
}

pub struct CompiledTrack {
    /// Unique pattern streams
    pub streams: Vec<CompiledPattern>,

    /// Stream index for each channel, for each frame
    pub frames: Vec<Vec<usize>>,

    /// Number of (pattern, channel) pairs compiled
    pub n_compiled: usize,

    /// Size of the compiled patterns before deduplication
    pub uncompressed_size: usize,
}

impl CompiledTrack {
    pub fn data_size(&self) -> usize {
        self.streams.iter().map(CompiledPattern::len).sum()
    }
}

/// Compiles every pattern used by a track and removes duplicate streams
pub fn compile_track(
    compiler: &PatternCompiler,
    track: usize,
) -> Result<CompiledTrack, ExportError> {
    let module = compiler.module();
    let song = module
        .song(track)
        .ok_or(ExportError::SongNotFound(track))?;
    let channels = module.channel_map().channels();

    let mut streams: Vec<CompiledPattern> = Vec::new();
    let mut compiled: HashMap<(usize, u8), usize> = HashMap::new();
    let mut uncompressed_size = 0;

    let mut frames = Vec::with_capacity(song.frames().len());

    for frame in song.frames() {
        let mut out = Vec::with_capacity(frame.len());

        for (channel_index, (&channel, &pattern)) in channels.iter().zip(frame).enumerate() {
            let index = match compiled.get(&(channel_index, pattern)) {
                Some(&i) => i,
                None => {
                    let c = compiler.compile(track, pattern, channel);
                    uncompressed_size += c.len();

                    let i = match streams.iter().position(|s| s.same_data(&c)) {
                        Some(i) => i,
                        None => {
                            streams.push(c);
                            streams.len() - 1
                        }
                    };
                    compiled.insert((channel_index, pattern), i);
                    i
                }
            };
            out.push(index);
        }

        frames.push(out);
    }

    Ok(CompiledTrack {
        streams,
        frames,
        n_compiled: compiled.len(),
        uncompressed_size,
    })
}

/// Concatenates the unique streams of a track
pub fn track_data(track: &CompiledTrack) -> Vec<u8> {
    let mut out = Vec::with_capacity(track.data_size());
    for s in &track.streams {
        out.extend_from_slice(&s.data);
    }
    out
}
