#![no_main]

use libfuzzer_sys::fuzz_target;

use compiler::channel_map::ChannelMap;
use compiler::data::parse_module_json;
use compiler::export::{compile_track, DpcmList, InstrumentList};
use compiler::{CompilerOptions, PatternCompiler, SoundChip, SoundChipSet};

const CHIPS: [SoundChip; 4] = [
    SoundChip::Apu,
    SoundChip::Vrc6,
    SoundChip::Fds,
    SoundChip::S5b,
];

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let chips = &CHIPS[..usize::from(data[0] % 4) + 1];

    let text = match std::str::from_utf8(&data[1..]) {
        Ok(s) => s,
        Err(_) => return,
    };

    let n_channels = ChannelMap::new(SoundChipSet::from_chips(chips), 1).len();
    let rows: Vec<&str> = text.lines().collect();
    let rows = match serde_json::to_string(&rows) {
        Ok(r) => r,
        Err(_) => return,
    };

    let chip_names: Vec<String> = chips.iter().map(|c| format!("\"{}\"", c)).collect();
    let channels: Vec<String> = (0..n_channels)
        .map(|_| format!(r#"{{ "effect_columns": 4, "patterns": {{ "0": {} }} }}"#, rows))
        .collect();

    let json = format!(
        r#"{{
            "chips": [{}],
            "instruments": [ {{ "id": 0, "type": "2A03", "dpcm": [ {{ "note": "C-3", "sample": 0 }} ] }} ],
            "dpcm_samples": [ {{ "name": "s", "source": "s.dmc" }} ],
            "grooves": [ {{ "id": 0, "entries": [6, 5] }} ],
            "songs": [{{ "pattern_length": 256, "frames": [[{}]], "channels": [{}] }}]
        }}"#,
        chip_names.join(","),
        vec!["0"; n_channels].join(","),
        channels.join(","),
    );

    let module = match parse_module_json(&json) {
        Ok(m) => m,
        Err(_) => return,
    };

    let instruments = InstrumentList::from_module(&module);
    let dpcm_list = DpcmList::from_module(&module).unwrap();
    let compiler = PatternCompiler::new(
        &module,
        &instruments,
        &dpcm_list,
        CompilerOptions::default(),
        None,
    );

    let track = compile_track(&compiler, 0).unwrap();
    for f in &track.frames {
        assert!(f.iter().all(|&i| i < track.streams.len()));
    }
});
