//! NTSC and PAL clock domains

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub const MASTER_CLOCK_NTSC: u32 = 1_789_773;
pub const MASTER_CLOCK_PAL: u32 = 1_662_607;

const NOISE_PERIODS_NTSC: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];
const NOISE_PERIODS_PAL: [u16; 16] = [
    4, 8, 14, 30, 60, 88, 118, 148, 188, 236, 354, 472, 708, 944, 1890, 3778,
];

const DMC_PERIODS_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];
const DMC_PERIODS_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Machine {
    #[default]
    Ntsc,
    Pal,
}

/// Clock rate and the period tables that depend on it.
#[derive(Debug, PartialEq, Eq)]
pub struct ClockDomain {
    pub machine: Machine,
    pub master_clock: u32,
    /// Video frame rate in Hz
    pub frame_rate: u32,
    /// Cycles between frame-sequencer steps (4 steps per video frame)
    pub sequencer_period: u32,
    pub noise_periods: &'static [u16; 16],
    pub dmc_periods: &'static [u16; 16],
}

pub const NTSC: ClockDomain = ClockDomain {
    machine: Machine::Ntsc,
    master_clock: MASTER_CLOCK_NTSC,
    frame_rate: 60,
    sequencer_period: MASTER_CLOCK_NTSC / 240,
    noise_periods: &NOISE_PERIODS_NTSC,
    dmc_periods: &DMC_PERIODS_NTSC,
};

pub const PAL: ClockDomain = ClockDomain {
    machine: Machine::Pal,
    master_clock: MASTER_CLOCK_PAL,
    frame_rate: 50,
    sequencer_period: MASTER_CLOCK_PAL / 200,
    noise_periods: &NOISE_PERIODS_PAL,
    dmc_periods: &DMC_PERIODS_PAL,
};

impl Machine {
    pub fn clock_domain(self) -> &'static ClockDomain {
        match self {
            Machine::Ntsc => &NTSC,
            Machine::Pal => &PAL,
        }
    }
}

impl ClockDomain {
    /// Master clock cycles in one video frame
    pub fn cycles_per_frame(&self) -> u32 {
        self.master_clock / self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequencer_periods() {
        assert_eq!(NTSC.sequencer_period, 7457);
        assert_eq!(PAL.sequencer_period, 8313);
    }

    #[test]
    fn tables_differ_between_machines() {
        assert_eq!(Machine::Ntsc.clock_domain().noise_periods[2], 16);
        assert_eq!(Machine::Pal.clock_domain().noise_periods[2], 14);
        assert_eq!(Machine::Ntsc.clock_domain().dmc_periods[0], 428);
        assert_eq!(Machine::Pal.clock_domain().dmc_periods[0], 398);
    }
}
