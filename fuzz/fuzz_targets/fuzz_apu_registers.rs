#![no_main]

use libfuzzer_sys::fuzz_target;

use apu_emu::{Apu, Machine, NullMixer, FIRST_REGISTER};

fuzz_target!(|data: &[u8]| {
    let mut apu = Apu::new(NullMixer, Machine::Ntsc);
    apu.write_sample(&[0x55, 0xaa, 0x0f, 0xf0]);

    // (register, value, cycles) triplets
    for c in data.chunks_exact(3) {
        apu.write_register(FIRST_REGISTER + u16::from(c[0] & 0x1f), c[1]);
        apu.advance(u32::from(c[2]) * 16);

        assert!(apu.frame_sequence() < 5);
    }
    apu.end_frame();
});
