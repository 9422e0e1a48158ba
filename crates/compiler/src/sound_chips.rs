//! Sound chip identifiers

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use std::fmt::Display;

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SoundChip {
    #[serde(rename = "2A03")]
    Apu,
    #[serde(rename = "VRC6")]
    Vrc6,
    #[serde(rename = "VRC7")]
    Vrc7,
    #[serde(rename = "FDS")]
    Fds,
    #[serde(rename = "MMC5")]
    Mmc5,
    #[serde(rename = "N163")]
    N163,
    #[serde(rename = "S5B")]
    S5b,
}

impl SoundChip {
    pub const ALL: [SoundChip; 7] = [
        SoundChip::Apu,
        SoundChip::Vrc6,
        SoundChip::Vrc7,
        SoundChip::Fds,
        SoundChip::Mmc5,
        SoundChip::N163,
        SoundChip::S5b,
    ];

    fn mask(self) -> u8 {
        match self {
            SoundChip::Apu => 1 << 0,
            SoundChip::Vrc6 => 1 << 1,
            SoundChip::Vrc7 => 1 << 2,
            SoundChip::Fds => 1 << 3,
            SoundChip::Mmc5 => 1 << 4,
            SoundChip::N163 => 1 << 5,
            SoundChip::S5b => 1 << 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundChip::Apu => "2A03",
            SoundChip::Vrc6 => "VRC6",
            SoundChip::Vrc7 => "VRC7",
            SoundChip::Fds => "FDS",
            SoundChip::Mmc5 => "MMC5",
            SoundChip::N163 => "N163",
            SoundChip::S5b => "S5B",
        }
    }
}

impl Display for SoundChip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of sound chips used by a module.
///
/// The 2A03 is always present.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SoundChipSet(u8);

impl Default for SoundChipSet {
    fn default() -> Self {
        Self::APU_ONLY
    }
}

impl SoundChipSet {
    pub const APU_ONLY: Self = Self(1);

    pub fn from_chips(chips: &[SoundChip]) -> Self {
        chips.iter().fold(Self::APU_ONLY, |s, &c| s.with(c))
    }

    pub fn with(self, chip: SoundChip) -> Self {
        Self(self.0 | chip.mask())
    }

    pub fn contains(&self, chip: SoundChip) -> bool {
        self.0 & chip.mask() != 0
    }

    pub fn n_expansion_chips(&self) -> u32 {
        (self.0 & !SoundChip::Apu.mask()).count_ones()
    }

    /// True if more than one expansion chip is in use
    pub fn is_multi_chip(&self) -> bool {
        self.n_expansion_chips() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = SoundChip> + '_ {
        SoundChip::ALL.into_iter().filter(|&c| self.contains(c))
    }
}

impl Display for SoundChipSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for c in self.iter() {
            if !first {
                f.write_str(" + ")?;
            }
            f.write_str(c.name())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apu_always_present() {
        let s = SoundChipSet::from_chips(&[]);
        assert!(s.contains(SoundChip::Apu));
        assert_eq!(s.n_expansion_chips(), 0);
        assert!(!s.is_multi_chip());
    }

    #[test]
    fn multi_chip() {
        let s = SoundChipSet::from_chips(&[SoundChip::Apu, SoundChip::Vrc6]);
        assert!(!s.is_multi_chip());
        assert!(s.contains(SoundChip::Vrc6));
        assert!(!s.contains(SoundChip::Fds));

        let s = s.with(SoundChip::N163);
        assert!(s.is_multi_chip());
        assert_eq!(s.to_string(), "2A03 + VRC6 + N163");
    }
}
