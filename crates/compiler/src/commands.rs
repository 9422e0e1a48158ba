//! Playback-driver command table

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::stream::FIRST_COMMAND;
use crate::sound_chips::{SoundChip, SoundChipSet};

// Order MUST match the playback driver's command table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Instrument,
    Hold,
    SetDuration,
    ResetDuration,
    Speed,
    Tempo,
    Jump,
    Skip,
    Halt,
    Volume,
    Clear,
    PortaUp,
    PortaDown,
    Portamento,
    Arpeggio,
    Vibrato,
    Tremolo,
    Pitch,
    ResetPitch,
    Duty,
    Delay,
    Sweep,
    Dac,
    Offset,
    SlideUp,
    SlideDown,
    VolSlide,
    NoteCut,
    Retrigger,
    DpcmPitch,
    NoteRelease,
    LinearCounter,
    Groove,
    DelayedVolume,
    Transpose,

    Vrc7Patch,
    Vrc7Port,
    Vrc7Write,

    FdsModDepth,
    FdsModRateHi,
    FdsModRateLo,
    FdsVolume,
    FdsModBias,

    N163WaveBuffer,

    S5bEnvType,
    S5bEnvRateHi,
    S5bEnvRateLo,
    S5bNoise,
}

const VRC7_FIRST: u8 = Command::Vrc7Patch as u8;
const VRC7_LAST: u8 = Command::Vrc7Write as u8;
const FDS_FIRST: u8 = Command::FdsModDepth as u8;
const FDS_LAST: u8 = Command::FdsModBias as u8;
const N163_FIRST: u8 = Command::N163WaveBuffer as u8;
const N163_LAST: u8 = Command::N163WaveBuffer as u8;

pub const N_COMMANDS: u8 = Command::S5bNoise as u8 + 1;

impl Command {
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Returns the command byte for `command`.
///
/// If the module uses at most one expansion chip, the commands of the absent N163, FDS and
/// VRC7 chips are removed from the command table.
pub fn command_byte(command: Command, chips: SoundChipSet) -> u8 {
    let mut cmd = command.ordinal();

    if !chips.is_multi_chip() {
        if !chips.contains(SoundChip::N163) && cmd > N163_LAST {
            cmd -= N163_LAST - N163_FIRST + 1;
        }
        if !chips.contains(SoundChip::Fds) && cmd > FDS_LAST {
            cmd -= FDS_LAST - FDS_FIRST + 1;
        }
        if !chips.contains(SoundChip::Vrc7) && cmd > VRC7_LAST {
            cmd -= VRC7_LAST - VRC7_FIRST + 1;
        }
    }

    (cmd << 1) | FIRST_COMMAND
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_constants::stream::LAST_COMMAND;

    #[test]
    fn base_commands_are_not_renumbered() {
        for chips in [
            SoundChipSet::APU_ONLY,
            SoundChipSet::from_chips(&[SoundChip::Vrc7]),
            SoundChipSet::from_chips(&[SoundChip::Fds, SoundChip::N163]),
        ] {
            assert_eq!(command_byte(Command::Instrument, chips), 0x80);
            assert_eq!(command_byte(Command::Hold, chips), 0x82);
            assert_eq!(command_byte(Command::Transpose, chips), 0xc4);
        }
    }

    #[test]
    fn base_chip_only() {
        let chips = SoundChipSet::APU_ONLY;

        // Sunsoft commands move down 1 + 5 + 3 slots
        assert_eq!(command_byte(Command::S5bEnvType, chips), (35 << 1) | 0x80);
        assert_eq!(command_byte(Command::S5bNoise, chips), (38 << 1) | 0x80);
    }

    #[test]
    fn single_expansion_chip() {
        let fds = SoundChipSet::from_chips(&[SoundChip::Fds]);
        assert_eq!(command_byte(Command::FdsModDepth, fds), (35 << 1) | 0x80);
        assert_eq!(command_byte(Command::FdsModBias, fds), (39 << 1) | 0x80);

        let n163 = SoundChipSet::from_chips(&[SoundChip::N163]);
        assert_eq!(command_byte(Command::N163WaveBuffer, n163), (35 << 1) | 0x80);

        let s5b = SoundChipSet::from_chips(&[SoundChip::S5b]);
        assert_eq!(command_byte(Command::S5bEnvType, s5b), (35 << 1) | 0x80);
    }

    #[test]
    fn multi_chip_is_not_renumbered() {
        let chips = SoundChipSet::from_chips(&[SoundChip::Vrc6, SoundChip::S5b]);

        for c in [
            Command::Vrc7Patch,
            Command::FdsVolume,
            Command::N163WaveBuffer,
            Command::S5bNoise,
        ] {
            assert_eq!(command_byte(c, chips), (c.ordinal() << 1) | 0x80);
        }
    }

    #[test]
    fn commands_fit_in_range() {
        assert_eq!(N_COMMANDS, 48);

        let all = SoundChipSet::from_chips(&[SoundChip::Vrc7, SoundChip::S5b]);
        assert!(command_byte(Command::S5bNoise, all) <= LAST_COMMAND);
    }
}
