//! Pattern effects

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::errors::RowError;
use crate::sound_chips::SoundChip;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Speed,
    Jump,
    Skip,
    Halt,
    Volume,
    Portamento,
    PortaUp,
    PortaDown,
    SweepUp,
    SweepDown,
    Arpeggio,
    Vibrato,
    Tremolo,
    Pitch,
    Delay,
    Dac,
    DutyCycle,
    SampleOffset,
    SlideUp,
    SlideDown,
    VolumeSlide,
    NoteCut,
    Retrigger,
    DpcmPitch,
    NoteRelease,
    Groove,
    DelayedVolume,
    Transpose,

    Vrc7Port,
    Vrc7Write,

    FdsModDepth,
    FdsModSpeedHi,
    FdsModSpeedLo,
    FdsVolume,
    FdsModBias,

    N163WaveBuffer,

    S5bEnvType,
    S5bEnvHi,
    S5bEnvLo,
    S5bNoise,
}

fn common_effect(letter: char) -> Option<EffectKind> {
    match letter {
        'F' => Some(EffectKind::Speed),
        'B' => Some(EffectKind::Jump),
        'D' => Some(EffectKind::Skip),
        'C' => Some(EffectKind::Halt),
        'E' => Some(EffectKind::Volume),
        '3' => Some(EffectKind::Portamento),
        '1' => Some(EffectKind::PortaUp),
        '2' => Some(EffectKind::PortaDown),
        '0' => Some(EffectKind::Arpeggio),
        '4' => Some(EffectKind::Vibrato),
        '7' => Some(EffectKind::Tremolo),
        'P' => Some(EffectKind::Pitch),
        'G' => Some(EffectKind::Delay),
        'V' => Some(EffectKind::DutyCycle),
        'Q' => Some(EffectKind::SlideUp),
        'R' => Some(EffectKind::SlideDown),
        'A' => Some(EffectKind::VolumeSlide),
        'S' => Some(EffectKind::NoteCut),
        'L' => Some(EffectKind::NoteRelease),
        'O' => Some(EffectKind::Groove),
        'M' => Some(EffectKind::DelayedVolume),
        'T' => Some(EffectKind::Transpose),
        _ => None,
    }
}

// Chip specific letters take priority over the common letters
fn chip_effect(chip: SoundChip, letter: char) -> Option<EffectKind> {
    match (chip, letter) {
        (SoundChip::Apu, 'H') => Some(EffectKind::SweepUp),
        (SoundChip::Apu, 'I') => Some(EffectKind::SweepDown),
        (SoundChip::Apu, 'Z') => Some(EffectKind::Dac),
        (SoundChip::Apu, 'Y') => Some(EffectKind::SampleOffset),
        (SoundChip::Apu, 'X') => Some(EffectKind::Retrigger),
        (SoundChip::Apu, 'W') => Some(EffectKind::DpcmPitch),

        (SoundChip::Fds, 'H') => Some(EffectKind::FdsModDepth),
        (SoundChip::Fds, 'I') => Some(EffectKind::FdsModSpeedHi),
        (SoundChip::Fds, 'J') => Some(EffectKind::FdsModSpeedLo),
        (SoundChip::Fds, 'E') => Some(EffectKind::FdsVolume),
        (SoundChip::Fds, 'Z') => Some(EffectKind::FdsModBias),

        (SoundChip::S5b, 'H') => Some(EffectKind::S5bEnvHi),
        (SoundChip::S5b, 'I') => Some(EffectKind::S5bEnvLo),
        (SoundChip::S5b, 'J') => Some(EffectKind::S5bEnvType),
        (SoundChip::S5b, 'W') => Some(EffectKind::S5bNoise),

        (SoundChip::Vrc7, 'H') => Some(EffectKind::Vrc7Port),
        (SoundChip::Vrc7, 'I') => Some(EffectKind::Vrc7Write),

        (SoundChip::N163, 'Z') => Some(EffectKind::N163WaveBuffer),

        _ => None,
    }
}

impl EffectKind {
    /// Effect letters depend on the channel's sound chip
    pub fn from_letter(letter: char, chip: SoundChip) -> Option<Self> {
        chip_effect(chip, letter).or_else(|| common_effect(letter))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Effect {
    pub kind: EffectKind,
    pub param: u8,
}

impl Effect {
    pub fn new(kind: EffectKind, param: u8) -> Self {
        Self { kind, param }
    }

    /// Parses an effect column (`4A3` or `...` for no effect)
    pub fn parse(s: &str, chip: SoundChip) -> Result<Option<Self>, RowError> {
        if s == "..." {
            return Ok(None);
        }

        let mut chars = s.chars();
        let letter = match chars.next() {
            Some(c) => c,
            None => return Err(RowError::InvalidEffect(s.to_owned())),
        };
        let param = chars.as_str();

        if param.len() != 2 {
            return Err(RowError::InvalidEffect(s.to_owned()));
        }
        let param = match u8::from_str_radix(param, 16) {
            Ok(p) => p,
            Err(_) => return Err(RowError::InvalidEffect(s.to_owned())),
        };

        match EffectKind::from_letter(letter, chip) {
            Some(kind) => Ok(Some(Effect { kind, param })),
            None => Err(RowError::UnknownEffect(letter, chip)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_dependent_letters() {
        assert_eq!(
            EffectKind::from_letter('H', SoundChip::Apu),
            Some(EffectKind::SweepUp)
        );
        assert_eq!(
            EffectKind::from_letter('H', SoundChip::Fds),
            Some(EffectKind::FdsModDepth)
        );
        assert_eq!(
            EffectKind::from_letter('E', SoundChip::Fds),
            Some(EffectKind::FdsVolume)
        );
        assert_eq!(
            EffectKind::from_letter('E', SoundChip::Vrc6),
            Some(EffectKind::Volume)
        );
        assert_eq!(EffectKind::from_letter('H', SoundChip::Vrc6), None);
        assert_eq!(EffectKind::from_letter('K', SoundChip::Apu), None);
    }

    #[test]
    fn parse_effect() {
        assert_eq!(
            Effect::parse("4A3", SoundChip::Apu).unwrap(),
            Some(Effect::new(EffectKind::Vibrato, 0xa3))
        );
        assert_eq!(Effect::parse("...", SoundChip::Apu).unwrap(), None);

        assert!(Effect::parse("4A", SoundChip::Apu).is_err());
        assert!(Effect::parse("4AXY", SoundChip::Apu).is_err());
        assert!(Effect::parse("4G0", SoundChip::Apu).is_err());
        assert!(Effect::parse("K00", SoundChip::Apu).is_err());
    }
}
