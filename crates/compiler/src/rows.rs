//! Pattern rows

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::{MAX_EFFECT_COLUMNS, MAX_INSTRUMENTS, MAX_VOLUME};
use crate::effects::{Effect, EffectKind};
use crate::errors::{RowError, ValueError};
use crate::newtype_macros::u8_newtype;
use crate::notes::Note;
use crate::sound_chips::SoundChip;

u8_newtype!(InstrumentId, InstrumentIdOutOfRange, 0, (MAX_INSTRUMENTS - 1) as u8);
u8_newtype!(Volume, VolumeOutOfRange, 0, MAX_VOLUME);

/// The instrument column of a pattern row
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RowInstrument {
    #[default]
    None,
    Hold,
    Index(InstrumentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChanNote {
    pub note: Note,
    pub instrument: RowInstrument,
    pub volume: Option<Volume>,
    pub effects: [Option<Effect>; MAX_EFFECT_COLUMNS],
}

pub static EMPTY_ROW: ChanNote = ChanNote {
    note: Note::None,
    instrument: RowInstrument::None,
    volume: None,
    effects: [None; MAX_EFFECT_COLUMNS],
};

impl ChanNote {
    /// True if the row sets a note, instrument, volume or effect
    pub fn is_used(&self, effect_columns: usize) -> bool {
        self.note != Note::None
            || self.instrument != RowInstrument::None
            || self.volume.is_some()
            || self.effects.iter().take(effect_columns).any(Option::is_some)
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().flatten().any(|e| e.kind == kind)
    }

    /// Parses a row in tracker notation.
    ///
    /// `NOTE INST VOL [EFFECT...]`, for example `C-4 01 F 4A3 ...`.
    /// An empty string is an empty row.
    pub fn parse(s: &str, chip: SoundChip) -> Result<Self, RowError> {
        let mut columns = s.split_whitespace();

        let note = match columns.next() {
            Some(n) => Note::parse(n)?,
            None => return Ok(ChanNote::default()),
        };

        let instrument = match columns.next() {
            Some(i) => parse_instrument(i)?,
            None => return Err(RowError::NotEnoughColumns),
        };

        let volume = match columns.next() {
            Some(v) => parse_volume(v)?,
            None => return Err(RowError::NotEnoughColumns),
        };

        let mut effects = [None; MAX_EFFECT_COLUMNS];
        let mut n_effects = 0;
        for e in columns {
            if n_effects >= MAX_EFFECT_COLUMNS {
                return Err(RowError::TooManyEffects(n_effects + 1));
            }
            effects[n_effects] = Effect::parse(e, chip)?;
            n_effects += 1;
        }

        Ok(ChanNote {
            note,
            instrument,
            volume,
            effects,
        })
    }
}

fn parse_instrument(s: &str) -> Result<RowInstrument, RowError> {
    match s {
        ".." => Ok(RowInstrument::None),
        "&&" => Ok(RowInstrument::Hold),
        s if s.len() == 2 => match u8::from_str_radix(s, 16) {
            Ok(i) => match InstrumentId::try_from(i) {
                Ok(i) => Ok(RowInstrument::Index(i)),
                Err(_) => Err(RowError::InvalidInstrument(s.to_owned())),
            },
            Err(_) => Err(RowError::InvalidInstrument(s.to_owned())),
        },
        s => Err(RowError::InvalidInstrument(s.to_owned())),
    }
}

fn parse_volume(s: &str) -> Result<Option<Volume>, RowError> {
    if s == "." {
        return Ok(None);
    }

    let mut chars = s.chars();
    match (chars.next().and_then(|c| c.to_digit(16)), chars.next()) {
        (Some(v), None) => match Volume::try_from(v) {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(RowError::InvalidVolume(s.to_owned())),
        },
        _ => Err(RowError::InvalidVolume(s.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::MidiNote;

    fn inst(i: u8) -> RowInstrument {
        RowInstrument::Index(InstrumentId::try_from(i).unwrap())
    }

    #[test]
    fn parse_full_row() {
        let row = ChanNote::parse("C-4 1F A 4A3 ... G02", SoundChip::Apu).unwrap();

        assert_eq!(row.note, Note::Pitched(MidiNote::try_from(48u8).unwrap()));
        assert_eq!(row.instrument, inst(0x1f));
        assert_eq!(row.volume, Some(Volume::try_from(10u8).unwrap()));
        assert_eq!(
            row.effects,
            [
                Some(Effect::new(EffectKind::Vibrato, 0xa3)),
                None,
                Some(Effect::new(EffectKind::Delay, 0x02)),
                None,
            ]
        );
        assert!(row.is_used(1));
        assert!(row.has_effect(EffectKind::Delay));
    }

    #[test]
    fn parse_empty_rows() {
        assert_eq!(ChanNote::parse("", SoundChip::Apu).unwrap(), EMPTY_ROW);
        assert_eq!(ChanNote::parse("... .. .", SoundChip::Apu).unwrap(), EMPTY_ROW);
        assert_eq!(
            ChanNote::parse("... .. . ... ...", SoundChip::Apu).unwrap(),
            EMPTY_ROW
        );
        assert!(!EMPTY_ROW.is_used(4));
    }

    #[test]
    fn hold_instrument() {
        let row = ChanNote::parse("--- && .", SoundChip::Apu).unwrap();
        assert_eq!(row.note, Note::Halt);
        assert_eq!(row.instrument, RowInstrument::Hold);
    }

    #[test]
    fn effects_outside_columns_are_unused() {
        let row = ChanNote::parse("... .. . ... F06", SoundChip::Apu).unwrap();
        assert!(!row.is_used(1));
        assert!(row.is_used(2));
    }

    #[test]
    fn invalid_rows() {
        assert_eq!(
            ChanNote::parse("C-4", SoundChip::Apu),
            Err(RowError::NotEnoughColumns)
        );
        assert_eq!(
            ChanNote::parse("C-4 40 .", SoundChip::Apu),
            Err(RowError::InvalidInstrument("40".to_owned()))
        );
        assert_eq!(
            ChanNote::parse("C-4 .. 10", SoundChip::Apu),
            Err(RowError::InvalidVolume("10".to_owned()))
        );
        assert_eq!(
            ChanNote::parse("C-4 .. . H00", SoundChip::Vrc6),
            Err(RowError::UnknownEffect('H', SoundChip::Vrc6))
        );
        assert_eq!(
            ChanNote::parse("... .. . ... ... ... ... ...", SoundChip::Apu),
            Err(RowError::TooManyEffects(5))
        );
    }
}
