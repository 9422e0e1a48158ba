// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use apu_emu::{Apu, ChannelId, FrameMode, LevelMixer, Machine, NullMixer};

fn new_apu() -> Apu<NullMixer> {
    Apu::new(NullMixer, Machine::Ntsc)
}

fn playing_apu() -> Apu<NullMixer> {
    let mut apu = new_apu();

    apu.write_register(0x4015, 0x1f);
    for (address, value) in [
        (0x4000, 0x9f),
        (0x4001, 0x8a),
        (0x4002, 0x40),
        (0x4003, 0x21),
        (0x4004, 0x5c),
        (0x4006, 0xa0),
        (0x4007, 0x30),
        (0x4008, 0x20),
        (0x400a, 0x80),
        (0x400b, 0x10),
        (0x400c, 0x38),
        (0x400e, 0x04),
        (0x400f, 0x50),
        (0x4010, 0x4e),
        (0x4011, 0x40),
    ] {
        apu.write_register(address, value);
    }
    apu
}

#[test]
fn register_write_isolation() {
    // Crosses several frame sequencer steps
    let steps = [1, 7, 333, 7457, 20000, 5];

    for address in 0x4000..=0x401f_u16 {
        if address == 0x4015 || address == 0x4017 {
            continue;
        }

        let mut before = playing_apu();
        let mut apu = playing_apu();
        apu.write_register(address, 0xff);

        let target = address & 0x1c;

        for &cycles in steps.iter().cycle().take(24) {
            before.advance(cycles);
            apu.advance(cycles);

            if target != 0x00 {
                assert_eq!(apu.square1(), before.square1(), "${address:04x}");
            }
            if target != 0x04 {
                assert_eq!(apu.square2(), before.square2(), "${address:04x}");
            }
            if target != 0x08 {
                assert_eq!(apu.triangle(), before.triangle(), "${address:04x}");
            }
            if target != 0x0c {
                assert_eq!(apu.noise(), before.noise(), "${address:04x}");
            }
            if target != 0x10 {
                assert_eq!(apu.dpcm(), before.dpcm(), "${address:04x}");
            }

            assert_eq!(apu.frame_sequence(), before.frame_sequence());
            assert_eq!(apu.frame_mode(), FrameMode::FourStep);
        }
    }
}

#[test]
fn frame_sequence_index_is_bounded() {
    let mut apu = new_apu();

    // Uneven step sizes so sequencer steps land inside advance slices
    let steps = [1, 7, 100, 3000, 7457, 12345, 29828, 5];

    for i in 0..200 {
        if i == 100 {
            apu.write_register(0x4017, 0x80);
        }
        apu.advance(steps[i % steps.len()]);

        match apu.frame_mode() {
            FrameMode::FourStep => assert!(apu.frame_sequence() <= 3),
            FrameMode::FiveStep => assert!(apu.frame_sequence() <= 4),
        }
    }
}

#[test]
fn five_step_mode_clocks_immediately() {
    let mut apu = new_apu();

    apu.write_register(0x4015, 0x05);
    apu.write_register(0x4000, 0x10);
    apu.write_register(0x4003, 0x18); // length 2
    apu.write_register(0x4008, 0x05);
    apu.write_register(0x400b, 0x08);

    assert_eq!(apu.square1().length_counter(), 2);
    assert_eq!(apu.triangle().linear_counter(), 0);

    apu.write_register(0x4017, 0x80);

    assert_eq!(apu.frame_mode(), FrameMode::FiveStep);
    assert_eq!(apu.frame_sequence(), 0);
    assert_eq!(apu.square1().length_counter(), 1);
    assert_eq!(apu.triangle().linear_counter(), 5);
    assert_eq!(apu.triangle().length_counter(), 253);
}

#[test]
fn four_step_mode_does_not_clock() {
    let mut apu = new_apu();

    apu.write_register(0x4015, 0x01);
    apu.write_register(0x4003, 0x18);
    apu.write_register(0x4017, 0x00);

    assert_eq!(apu.square1().length_counter(), 2);
}

#[test]
fn length_counters_clocked_twice_per_frame() {
    let mut apu = new_apu();

    apu.write_register(0x4015, 0x01);
    apu.write_register(0x4003, 0x00); // length 10

    let frame = apu.clock_domain().sequencer_period * 4;
    apu.advance(frame);

    assert_eq!(apu.square1().length_counter(), 8);
    assert_eq!(apu.frame_sequence(), 0);
}

#[test]
fn status_register() {
    let mut apu = new_apu();

    apu.write_register(0x4015, 0x0f);
    apu.write_register(0x4003, 0x08);
    apu.write_register(0x4007, 0x08);
    apu.write_register(0x400b, 0x08);
    apu.write_register(0x400f, 0x08);

    assert_eq!(apu.read_register(0x4015), Some(0x0f));

    apu.write_register(0x4015, 0x05);
    assert_eq!(apu.read_register(0x4015), Some(0x05));

    apu.write_register(0x4015, 0x00);
    assert_eq!(apu.read_register(0x4015), Some(0x00));
}

#[test]
fn dpcm_status_and_irq() {
    let mut apu = new_apu();
    apu.write_sample(&[0xaa; 32]);

    apu.write_register(0x4010, 0x8f);
    apu.write_register(0x4013, 0x01); // 17 bytes
    apu.write_register(0x4015, 0x10);

    assert_eq!(apu.read_register(0x4015), Some(0x10));
    assert!(apu.dpcm_playing());

    // 17 bytes * 8 bits at the fastest rate, plus the first timer period
    apu.advance(428 + 17 * 8 * 54);

    assert!(!apu.dpcm_playing());
    assert_eq!(apu.read_register(0x4015), Some(0x80));

    apu.write_register(0x4015, 0x00);
    assert_eq!(apu.read_register(0x4015), Some(0x00));
}

#[test]
fn dpcm_playback() {
    let mut apu = Apu::new(LevelMixer::new(), Machine::Ntsc);
    apu.write_sample(&[0xff; 16]);

    apu.write_register(0x4010, 0x0f);
    apu.write_register(0x4011, 0x20);
    apu.write_register(0x4012, 0x00);
    apu.write_register(0x4013, 0x00); // 1 byte
    apu.write_register(0x4015, 0x10);

    apu.advance(428 + 16 * 54);

    assert_eq!(apu.delta_counter(), 0x20 + 8 * 2);
    assert_eq!(apu.mixer().level(ChannelId::Dpcm), 0x20 + 8 * 2);
    assert_eq!(apu.sample_position(), 1);

    apu.clear_sample();
    assert!(apu.sample_memory().is_empty());
}

#[test]
fn pal_clock_domain() {
    let mut apu = Apu::new(LevelMixer::new(), Machine::Ntsc);
    assert_eq!(apu.mixer().clock_rate(), 1_789_773);

    apu.write_register(0x400e, 0x0f);
    assert_eq!(apu.noise().timer_period(), 4068);

    apu.set_clock_domain(Machine::Pal);

    assert_eq!(apu.machine(), Machine::Pal);
    assert_eq!(apu.mixer().clock_rate(), 1_662_607);
    assert_eq!(apu.noise().timer_period(), 3778);
    assert_eq!(apu.dpcm().timer_period(), 398);
    assert_eq!(apu.clock_domain().sequencer_period, 8313);

    apu.reset();
    assert_eq!(apu.noise().timer_period(), 4);
    assert_eq!(apu.machine(), Machine::Pal);
}

#[test]
fn pulse_output_and_frequency() {
    let mut apu = Apu::new(LevelMixer::new(), Machine::Ntsc);

    apu.write_register(0x4015, 0x01);
    apu.write_register(0x4000, 0xbf);
    apu.write_register(0x4002, 0xfd);
    apu.write_register(0x4003, 0x08);

    apu.advance(apu.clock_domain().cycles_per_frame());
    apu.end_frame();

    assert!(apu.mixer().level_changes(ChannelId::Pulse1) > 0);
    assert_eq!(apu.mixer().level_changes(ChannelId::Pulse2), 0);

    let f = apu.frequency(ChannelId::Pulse1);
    assert!((f - 440.4).abs() < 0.5, "{f}");
}
