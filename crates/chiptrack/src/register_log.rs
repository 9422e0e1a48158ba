//! APU register log playback

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use apu_emu::{Apu, ChannelId, LevelMixer, Machine};
use compiler::module;

use relative_path::RelativePathBuf;
use serde::Deserialize;

/// A list of register writes for each video frame
#[derive(Deserialize, Debug)]
pub struct RegisterLog {
    #[serde(default)]
    pub machine: module::Machine,

    /// DPCM sample data, loaded at 0xc000
    #[serde(default)]
    pub sample: Option<RelativePathBuf>,

    pub frames: Vec<Vec<(u16, u8)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub frame: usize,
    pub status: u8,
    pub frequencies: [f64; 5],
    pub dpcm_position: u16,
}

pub fn apu_machine(m: module::Machine) -> Machine {
    match m {
        module::Machine::Ntsc => Machine::Ntsc,
        module::Machine::Pal => Machine::Pal,
    }
}

/// Replays the register log, calling `f` at the end of every frame
pub fn play_log(
    log: &RegisterLog,
    machine: Machine,
    sample: Option<&[u8]>,
    max_frames: Option<usize>,
    mut f: impl FnMut(&FrameState),
) {
    let mut apu = Apu::new(LevelMixer::new(), machine);
    if let Some(s) = sample {
        apu.write_sample(s);
    }

    let cycles_per_frame = apu.clock_domain().cycles_per_frame();
    let n_frames = max_frames.unwrap_or(usize::MAX).min(log.frames.len());

    for (frame, writes) in log.frames.iter().take(n_frames).enumerate() {
        for &(address, value) in writes {
            apu.write_register(address, value);
        }

        apu.advance(cycles_per_frame);
        apu.end_frame();

        let state = FrameState {
            frame,
            status: apu.read_register(0x4015).unwrap_or(0),
            frequencies: ChannelId::ALL.map(|c| apu.frequency(c)),
            dpcm_position: apu.sample_position(),
        };
        f(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_pulse_note() {
        let log: RegisterLog = serde_json::from_str(
            r##"{
                "frames": [
                    [ [16405, 1], [16384, 191], [16386, 253], [16387, 8] ],
                    [],
                    [ [16405, 0] ]
                ]
            }"##,
        )
        .unwrap();

        assert_eq!(log.machine, module::Machine::Ntsc);

        let mut states = Vec::new();
        play_log(&log, apu_machine(log.machine), None, None, |s| {
            states.push(s.clone())
        });

        assert_eq!(states.len(), 3);
        assert_eq!(states[0].status & 0x01, 0x01);
        assert_eq!(states[1].status & 0x01, 0x01);
        assert_eq!(states[2].status & 0x01, 0x00);

        // 1789773 / (16 * (253 + 1)) = 440.4 Hz
        let f = states[0].frequencies[0];
        assert!(f > 440.0 && f < 441.0, "{}", f);
    }

    #[test]
    fn frame_limit() {
        let log: RegisterLog = serde_json::from_str(
            r##"{ "machine": "pal", "frames": [ [], [], [], [] ] }"##,
        )
        .unwrap();

        let mut count = 0;
        play_log(&log, apu_machine(log.machine), None, Some(2), |_| count += 1);
        assert_eq!(count, 2);
    }
}
