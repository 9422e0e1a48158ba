//! Pattern compiler

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::channel_map::ChannelId;
use crate::commands::{command_byte, Command};
use crate::compiler_log::CompilerLog;
use crate::driver_constants::stream::{
    NOISE_NOTE_FLAG, NOTE_ECHO, NOTE_HALT, NOTE_RELEASE, N_PACKED_INSTRUMENTS, PACKED_INSTRUMENT,
    PACKED_VOLUME, REST,
};
use crate::driver_constants::{HOLD_INSTRUMENT, MAX_GROOVES, NO_INSTRUMENT};
use crate::effects::{Effect, EffectKind};
use crate::export::{DpcmList, InstrumentList};
use crate::module::{is_instrument_compatible, Module, Song, SongChannel};
use crate::notes::Note;
use crate::rows::{InstrumentId, RowInstrument};
use crate::sound_chips::{SoundChip, SoundChipSet};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Use the SetDuration command for runs of equally spaced rows
    pub optimize_durations: bool,

    /// Use single-byte instrument commands for instruments 0-15
    pub packed_instrument_change: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            optimize_durations: true,
            packed_instrument_change: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPattern {
    pub data: Vec<u8>,
    pub hash: u32,
}

impl CompiledPattern {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if the two streams can share the same data in the exported song
    pub fn same_data(&self, other: &CompiledPattern) -> bool {
        self.data.len() == other.data.len() && self.hash == other.hash && self.data == other.data
    }
}

/// Hash of a byte stream, updated one byte at a time
pub fn stream_hash(hash: u32, byte: u8) -> u32 {
    let mut h = hash.wrapping_add(u32::from(byte));
    h = h.wrapping_add(h << 10);
    h ^ (h >> 6)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct SpacingInfo {
    count: u32,
    size: Option<u8>,
}

struct StreamWriter {
    chips: SoundChipSet,

    data: Vec<u8>,
    hash: u32,

    duration: u32,
    // None if duration compression is disabled
    default_duration: Option<u8>,
}

impl StreamWriter {
    fn new(chips: SoundChipSet) -> Self {
        Self {
            chips,
            data: Vec::new(),
            hash: 0,
            duration: 0,
            default_duration: None,
        }
    }

    fn write(&mut self, byte: u8) {
        self.data.push(byte);
        self.hash = stream_hash(self.hash, byte);
    }

    fn command(&mut self, command: Command) {
        self.write(command_byte(command, self.chips));
    }

    fn command_with_param(&mut self, command: Command, param: u8) {
        self.command(command);
        self.write(param);
    }

    fn accumulate_duration(&mut self) {
        self.duration += 1;
    }

    fn write_duration(&mut self) {
        if self.default_duration.is_none() {
            if self.data.is_empty() && self.duration > 0 {
                self.write(REST);
            }
            if self.duration > 0 {
                self.write((self.duration - 1) as u8);
            }
        }

        self.duration = 0;
    }

    fn finish(self) -> CompiledPattern {
        CompiledPattern {
            data: self.data,
            hash: self.hash,
        }
    }
}

fn native_pitch_direction(chip: SoundChip, linear_pitch: bool) -> bool {
    !linear_pitch
        && matches!(
            chip,
            SoundChip::Apu | SoundChip::Vrc6 | SoundChip::Mmc5 | SoundChip::S5b
        )
}

pub struct PatternCompiler<'a> {
    module: &'a Module,
    instruments: &'a InstrumentList,
    dpcm_list: &'a DpcmList,
    options: CompilerOptions,
    log: Option<&'a dyn CompilerLog>,
}

impl<'a> PatternCompiler<'a> {
    pub fn new(
        module: &'a Module,
        instruments: &'a InstrumentList,
        dpcm_list: &'a DpcmList,
        options: CompilerOptions,
        log: Option<&'a dyn CompilerLog>,
    ) -> Self {
        Self {
            module,
            instruments,
            dpcm_list,
            options,
            log,
        }
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    pub fn options(&self) -> CompilerOptions {
        self.options
    }

    pub fn compare_data(a: &CompiledPattern, b: &CompiledPattern) -> bool {
        a.same_data(b)
    }

    fn log(&self, message: &str, row: usize, channel: ChannelId, pattern: u8) {
        if let Some(log) = self.log {
            log.write_log(&format!(
                "Error: {} (on row {}, channel {}, pattern {})",
                message, row, channel, pattern
            ));
        }
    }

    /// Compiles a single pattern of a single channel.
    ///
    /// Returns an empty stream if the track or channel does not exist.
    pub fn compile(&self, track: usize, pattern: u8, channel: ChannelId) -> CompiledPattern {
        let mut w = StreamWriter::new(self.module.chips());

        let song = match self.module.song(track) {
            Some(s) => s,
            None => return w.finish(),
        };
        let song_channel = match song.channel(channel) {
            Some(c) => c,
            None => return w.finish(),
        };

        let is_dpcm = channel.is_dpcm();
        let effect_columns = song_channel.effect_columns;

        let mut last_instrument = HOLD_INSTRUMENT;
        let mut dpcm_instrument = InstrumentId::MIN;

        for row_index in 0..song.pattern_length {
            let mut row = song.row(song_channel, pattern, row_index).clone();
            let effects = &mut row.effects[..effect_columns];

            let instrument = self.instruments.find(row.instrument);

            let mut action = false;

            if let RowInstrument::Index(id) = row.instrument {
                if matches!(row.note, Note::Pitched(_) | Note::Echo(_)) {
                    let compatible = self
                        .module
                        .instrument(id)
                        .is_some_and(|i| is_instrument_compatible(channel.chip, i.inst_type));
                    if !compatible {
                        self.log(
                            "Missing or incompatible instrument",
                            row_index,
                            channel,
                            pattern,
                        );
                    }
                }
            }

            // Delays must come first
            for j in 0..effects.len() {
                if let Some(Effect {
                    kind: EffectKind::Delay,
                    param,
                }) = effects[j]
                {
                    if param > 0 {
                        w.write_duration();

                        // Skip and jump effects are processed on the delayed row
                        for e in effects.iter_mut() {
                            match e {
                                Some(Effect {
                                    kind: EffectKind::Skip,
                                    param,
                                }) => {
                                    w.command_with_param(Command::Skip, param.wrapping_add(1));
                                    *e = None;
                                }
                                Some(Effect {
                                    kind: EffectKind::Jump,
                                    param,
                                }) => {
                                    w.command_with_param(Command::Jump, param.wrapping_add(1));
                                    *e = None;
                                }
                                _ => (),
                            }
                        }

                        action = true;
                        w.command_with_param(Command::Delay, param);
                    }
                }
            }

            if self.options.optimize_durations {
                if let Some(spacing) =
                    self.scan_note_lengths(song, song_channel, pattern, row_index)
                {
                    if spacing.count > 2 {
                        if spacing.size != w.default_duration {
                            if let Some(size) = spacing.size {
                                w.write_duration();
                                w.default_duration = Some(size);
                                w.command_with_param(Command::SetDuration, size);
                            }
                        }
                    } else if w.default_duration.is_some() && w.default_duration != spacing.size {
                        w.write_duration();
                        w.default_duration = None;
                        w.command(Command::ResetDuration);
                    }
                }
            }

            if !matches!(row.note, Note::Halt | Note::Release) {
                if instrument != last_instrument && instrument < NO_INSTRUMENT {
                    last_instrument = instrument;

                    if !is_dpcm {
                        w.write_duration();
                        if self.options.packed_instrument_change
                            && instrument < N_PACKED_INSTRUMENTS
                        {
                            w.write(PACKED_INSTRUMENT | instrument);
                        } else {
                            w.command_with_param(Command::Instrument, instrument << 1);
                        }
                        action = true;
                    } else if let RowInstrument::Index(id) = row.instrument {
                        dpcm_instrument = id;
                    }
                }

                if instrument == HOLD_INSTRUMENT && !is_dpcm {
                    w.write_duration();
                    w.command(Command::Hold);
                    action = true;
                }

                if self.options.optimize_durations
                    && instrument == last_instrument
                    && instrument < NO_INSTRUMENT
                    && !is_dpcm
                {
                    w.write_duration();
                    action = true;
                }
            }

            let note_index = match row.note {
                Note::None => None,
                Note::Halt => Some(NOTE_HALT),
                Note::Release => Some(NOTE_RELEASE),
                Note::Echo(offset) => Some(NOTE_ECHO + offset.as_u8()),
                Note::Pitched(note) => {
                    if is_dpcm {
                        match self.dpcm_list.sample_slot(dpcm_instrument, note) {
                            0 => {
                                self.log("Missing DPCM sample", row_index, channel, pattern);

                                // Play a rest instead
                                w.write_duration();
                                action = true;
                                None
                            }
                            slot => Some(slot - 1),
                        }
                    } else if channel.is_apu_noise() {
                        Some((note.as_u8() & 0x0f) | NOISE_NOTE_FLAG)
                    } else {
                        Some(note.as_u8())
                    }
                }
            };

            for effect in effects.iter().flatten() {
                w.write_duration();
                action = true;

                if let Some((command, param)) = self.translate_effect(song, channel, *effect) {
                    match param {
                        Some(p) => w.command_with_param(command, p),
                        None => w.command(command),
                    }
                }
            }

            if let Some(volume) = row.volume {
                w.write_duration();
                w.write(PACKED_VOLUME | volume.as_u8());
                action = true;
            }

            match note_index {
                None => {
                    if action {
                        w.write(REST);
                    }
                    w.accumulate_duration();
                }
                Some(n) => {
                    w.write_duration();
                    w.write(n + 1);
                    w.accumulate_duration();
                }
            }
        }

        w.write_duration();

        w.finish()
    }

    /// Returns the number of equally spaced used rows after `start_row` and their spacing.
    ///
    /// Returns None if `start_row` is unused.
    fn scan_note_lengths(
        &self,
        song: &Song,
        song_channel: &SongChannel,
        pattern: u8,
        start_row: usize,
    ) -> Option<SpacingInfo> {
        let effect_columns = song_channel.effect_columns;

        if !song
            .row(song_channel, pattern, start_row)
            .is_used(effect_columns)
        {
            return None;
        }

        let mut start_space: Option<u8> = None;
        let mut space: u8 = 0;
        let mut count = 0;

        for i in (start_row + 1)..song.pattern_length {
            if song.row(song_channel, pattern, i).is_used(effect_columns) {
                match start_space {
                    None => start_space = Some(space),
                    Some(s) if s == space => count += 1,
                    Some(_) => {
                        return Some(SpacingInfo {
                            count,
                            size: start_space,
                        })
                    }
                }
                space = 0;
            } else {
                space = space.saturating_add(1);
            }
        }

        if start_space == Some(space) {
            count += 1;
        }

        Some(SpacingInfo {
            count,
            size: start_space,
        })
    }

    /// Converts an effect to a driver command and optional parameter.
    ///
    /// Returns None if the effect is not supported by the channel.
    fn translate_effect(
        &self,
        song: &Song,
        channel: ChannelId,
        effect: Effect,
    ) -> Option<(Command, Option<u8>)> {
        let is_dpcm = channel.is_dpcm();
        let chip = channel.chip;
        let p = effect.param;

        let with = |c: Command, p: u8| Some((c, Some(p)));
        let clear_or = |c: Command| {
            if p == 0 {
                Some((Command::Clear, None))
            } else {
                Some((c, Some(p)))
            }
        };
        let nibble_swap = |p: u8| ((p & 0x0f) << 4) | (p >> 4);

        match effect.kind {
            EffectKind::Speed => {
                let command = if p >= self.module.speed_split_point && song.tempo != 0 {
                    Command::Tempo
                } else {
                    Command::Speed
                };
                // The driver halts on a speed of 0
                with(command, p.max(1))
            }
            EffectKind::Jump => with(Command::Jump, p.wrapping_add(1)),
            EffectKind::Skip => with(Command::Skip, p.wrapping_add(1)),
            EffectKind::Halt => with(Command::Halt, p),
            EffectKind::Volume => {
                let supported = (chip == SoundChip::Apu && !is_dpcm) || chip == SoundChip::Mmc5;
                let in_range = p <= 0x1f || (0xe0..=0xe3).contains(&p);
                // Out of range parameters drop the whole command, not just the parameter byte
                if supported && in_range {
                    with(Command::Volume, p & 0x9f)
                } else {
                    None
                }
            }
            EffectKind::Portamento if !is_dpcm => clear_or(Command::Portamento),
            EffectKind::Arpeggio if !is_dpcm => clear_or(Command::Arpeggio),
            EffectKind::PortaUp if !is_dpcm => {
                if native_pitch_direction(chip, self.module.linear_pitch) {
                    clear_or(Command::PortaUp)
                } else {
                    clear_or(Command::PortaDown)
                }
            }
            EffectKind::PortaDown if !is_dpcm => {
                if native_pitch_direction(chip, self.module.linear_pitch) {
                    clear_or(Command::PortaDown)
                } else {
                    clear_or(Command::PortaUp)
                }
            }
            EffectKind::SweepUp if channel.is_apu_pulse() => with(Command::Sweep, 0x88 | (p & 0x77)),
            EffectKind::SweepDown if channel.is_apu_pulse() => {
                with(Command::Sweep, 0x80 | (p & 0x77))
            }
            EffectKind::Vibrato if !is_dpcm => with(Command::Vibrato, nibble_swap(p)),
            EffectKind::Tremolo if !is_dpcm => with(Command::Tremolo, nibble_swap(p)),
            EffectKind::Pitch if !is_dpcm => {
                if p == 0x80 {
                    Some((Command::ResetPitch, None))
                } else if native_pitch_direction(chip, self.module.linear_pitch) {
                    with(Command::Pitch, p)
                } else {
                    match 0u8.wrapping_sub(p) {
                        0 => with(Command::Pitch, 0xff),
                        p => with(Command::Pitch, p),
                    }
                }
            }
            EffectKind::Dac if is_dpcm => with(Command::Dac, p & 0x7f),
            EffectKind::DutyCycle => match chip {
                SoundChip::Vrc7 => with(Command::Vrc7Patch, p << 4),
                SoundChip::S5b => with(Command::Duty, (p << 6) | ((p & 0x04) << 3)),
                _ if !channel.is_apu_triangle() && !is_dpcm => with(Command::Duty, p),
                _ => None,
            },
            EffectKind::SampleOffset if is_dpcm => with(Command::Offset, p),
            EffectKind::SlideUp if !is_dpcm => with(Command::SlideUp, p),
            EffectKind::SlideDown if !is_dpcm => with(Command::SlideDown, p),
            EffectKind::VolumeSlide if !is_dpcm => with(Command::VolSlide, p),
            EffectKind::NoteCut => {
                if p >= 0x80 && channel.is_apu_triangle() {
                    with(Command::LinearCounter, p - 0x80)
                } else if p < 0x80 {
                    with(Command::NoteCut, p)
                } else {
                    None
                }
            }
            EffectKind::Retrigger if is_dpcm => with(Command::Retrigger, p.wrapping_add(1)),
            EffectKind::DpcmPitch if is_dpcm => with(Command::DpcmPitch, p),
            EffectKind::NoteRelease if p < 0x80 => with(Command::NoteRelease, p),
            EffectKind::Groove if usize::from(p) < MAX_GROOVES => {
                let position: usize = 1 + (0..usize::from(p))
                    .filter_map(|g| self.module.groove(g))
                    .map(|g| g.compiled_size())
                    .sum::<usize>();
                with(Command::Groove, position as u8)
            }
            EffectKind::DelayedVolume if !is_dpcm && (p >> 4) != 0 && (p & 0x0f) != 0 => {
                with(Command::DelayedVolume, p)
            }
            EffectKind::Transpose if !is_dpcm => with(Command::Transpose, p),

            EffectKind::Vrc7Port if chip == SoundChip::Vrc7 => with(Command::Vrc7Port, p & 0x07),
            EffectKind::Vrc7Write if chip == SoundChip::Vrc7 => with(Command::Vrc7Write, p),

            EffectKind::FdsModDepth if chip == SoundChip::Fds => with(Command::FdsModDepth, p),
            EffectKind::FdsModSpeedHi if chip == SoundChip::Fds => with(Command::FdsModRateHi, p),
            EffectKind::FdsModSpeedLo if chip == SoundChip::Fds => with(Command::FdsModRateLo, p),
            EffectKind::FdsModBias if chip == SoundChip::Fds => with(Command::FdsModBias, p),
            EffectKind::FdsVolume if chip == SoundChip::Fds => match p {
                0xe0 => with(Command::FdsVolume, 0x80),
                p => with(Command::FdsVolume, p ^ 0x40),
            },

            EffectKind::S5bEnvType if chip == SoundChip::S5b => with(Command::S5bEnvType, p),
            EffectKind::S5bEnvHi if chip == SoundChip::S5b => with(Command::S5bEnvRateHi, p),
            EffectKind::S5bEnvLo if chip == SoundChip::S5b => with(Command::S5bEnvRateLo, p),
            EffectKind::S5bNoise if chip == SoundChip::S5b => with(Command::S5bNoise, p & 0x1f),

            EffectKind::N163WaveBuffer if chip == SoundChip::N163 && p <= 0x7f => match p {
                0x7f => with(Command::N163WaveBuffer, 0x80),
                p => with(Command::N163WaveBuffer, p),
            },

            // Delays are handled before the other effects
            EffectKind::Delay => None,

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_rule() {
        let mut h = 0u32;
        for b in [0x00, 0x00, 0x31] {
            h = stream_hash(h, b);
        }

        // 0x31 => 0x31 + 0xc400 = 0xc431 => 0xc431 ^ 0x310 = 0xc721
        assert_eq!(h, 0xc721);

        assert_eq!(stream_hash(0, 0x80), {
            let h: u32 = 0x80 + (0x80 << 10);
            h ^ (h >> 6)
        });
    }

    #[test]
    fn hash_wraps() {
        let h = stream_hash(u32::MAX, 0xff);
        let mut e = u32::MAX.wrapping_add(0xff);
        e = e.wrapping_add(e << 10);
        e ^= e >> 6;
        assert_eq!(h, e);
    }

    #[test]
    fn same_data() {
        let a = CompiledPattern {
            data: vec![0, 1, 2],
            hash: 5,
        };
        let mut b = a.clone();
        assert!(a.same_data(&b));

        b.data[2] = 3;
        assert!(!a.same_data(&b));

        let c = CompiledPattern {
            data: vec![0, 1, 2],
            hash: 6,
        };
        assert!(!a.same_data(&c));
    }

    #[test]
    fn pitch_direction() {
        assert!(native_pitch_direction(SoundChip::Apu, false));
        assert!(native_pitch_direction(SoundChip::S5b, false));
        assert!(!native_pitch_direction(SoundChip::Apu, true));
        assert!(!native_pitch_direction(SoundChip::N163, false));
        assert!(!native_pitch_direction(SoundChip::Fds, false));
    }
}
