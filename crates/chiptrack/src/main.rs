//! chiptrack binary

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod register_log;

use clap::{Args, Parser, Subcommand};
use compiler::data::{load_module_file, ModuleFile};
use compiler::export::{compile_track, track_data, DpcmList, InstrumentList};
use compiler::{CompilerLog, CompilerOptions, Module, PatternCompiler, StderrLog};
use register_log::{apu_machine, play_log, RegisterLog};

use apu_emu::{ChannelId, Machine};

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit(1);
    }};
}

/// DPCM samples must start on a 64 byte boundary
const DPCM_SAMPLE_ALIGNMENT: usize = 64;

#[derive(Parser)]
#[command(author, version)]
#[command(about = "tracker module pattern compiler and 2A03 APU player")]
#[command(arg_required_else_help = true)]
struct ArgParser {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the patterns of a module track
    Compile(CompileArgs),

    /// Play an APU register log
    Play(PlayArgs),
}

// Compile
// =======

#[derive(Args)]
struct CompileArgs {
    #[arg(short = 'o', long, value_name = "FILE", help = "output file")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "DPCM sample bank output file")]
    dpcm_bank: Option<PathBuf>,

    #[arg(short = 't', long, default_value_t = 0, help = "track number")]
    track: usize,

    #[arg(long, help = "do not compress row durations")]
    no_optimize_durations: bool,

    #[arg(long, help = "do not use single-byte instrument commands")]
    no_packed_instruments: bool,

    #[arg(value_name = "JSON_FILE", help = "module json file")]
    json_file: PathBuf,
}

fn compile(args: CompileArgs) {
    let module_file = load_module(args.json_file);
    let parent_path = module_file.parent_path.clone();

    let module = match Module::try_from(module_file) {
        Ok(m) => m,
        Err(errors) => {
            eprintln!("Cannot load module");
            for e in errors.0 {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    };

    let options = CompilerOptions {
        optimize_durations: !args.no_optimize_durations,
        packed_instrument_change: !args.no_packed_instruments,
    };

    let instruments = InstrumentList::from_module(&module);
    let dpcm_list = match DpcmList::from_module(&module) {
        Ok(l) => l,
        Err(e) => error!("{}", e),
    };

    let log: &dyn CompilerLog = &StderrLog;
    let compiler = PatternCompiler::new(&module, &instruments, &dpcm_list, options, Some(log));

    let track = match compile_track(&compiler, args.track) {
        Ok(t) => t,
        Err(e) => error!("{}", e),
    };

    for (i, s) in track.streams.iter().enumerate() {
        println!("{:3}: {:5} bytes, hash {:08x}", i, s.len(), s.hash);
    }
    println!();
    println!("{} chips", module.chips());
    println!(
        "{} patterns compiled, {} unique",
        track.n_compiled,
        track.streams.len()
    );
    println!(
        "{} bytes, {} bytes before deduplication",
        track.data_size(),
        track.uncompressed_size
    );

    if let Some(output) = args.output {
        write_data(output, track_data(&track));
    }

    if let Some(path) = args.dpcm_bank {
        let bank = build_dpcm_bank(&module, &parent_path);
        write_data(path, bank);
    }
}

fn build_dpcm_bank(module: &Module, parent_path: &Path) -> Vec<u8> {
    let mut out = Vec::new();

    for s in module.dpcm_samples() {
        let path = s.source.to_path(parent_path);
        let data = match fs::read(&path) {
            Ok(d) => d,
            Err(e) => error!("Cannot load DPCM sample {}: {}", path.display(), e),
        };

        out.extend_from_slice(&data);

        let padding = (DPCM_SAMPLE_ALIGNMENT - out.len() % DPCM_SAMPLE_ALIGNMENT)
            % DPCM_SAMPLE_ALIGNMENT;
        out.resize(out.len() + padding, 0);
    }

    out
}

// Play
// ====

#[derive(Args)]
struct PlayArgs {
    #[arg(long, help = "use the PAL clock rate")]
    pal: bool,

    #[arg(short = 'f', long, help = "maximum number of frames to play")]
    frames: Option<usize>,

    #[arg(value_name = "JSON_FILE", help = "register log json file")]
    json_file: PathBuf,
}

fn play(args: PlayArgs) {
    let log = load_register_log(&args.json_file);

    let machine = if args.pal {
        Machine::Pal
    } else {
        apu_machine(log.machine)
    };

    let sample = log.sample.as_ref().map(|s| {
        let parent = args.json_file.parent().unwrap_or(Path::new(""));
        let path = s.to_path(parent);
        match fs::read(&path) {
            Ok(d) => d,
            Err(e) => error!("Cannot load sample {}: {}", path.display(), e),
        }
    });

    print!("frame status");
    for c in ChannelId::ALL {
        print!(" {:>10}", c.name());
    }
    println!(" dpcm_addr");

    play_log(&log, machine, sample.as_deref(), args.frames, |state| {
        print!("{:5}    {:02x}", state.frame, state.status);
        for f in state.frequencies {
            print!(" {:10.2}", f);
        }
        println!("      {:04x}", state.dpcm_position);
    });
}

fn main() {
    let args = ArgParser::parse();

    match args.command {
        Command::Compile(c) => compile(c),
        Command::Play(c) => play(c),
    }
}

fn load_module(path: PathBuf) -> ModuleFile {
    match load_module_file(path) {
        Ok(m) => m,
        Err(e) => error!("{}", e),
    }
}

fn load_register_log(path: &Path) -> RegisterLog {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => error!("Unable to open {}: {}", path.display(), e),
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(l) => l,
        Err(e) => error!("Unable to read {}: {}", path.display(), e),
    }
}

fn write_data(path: PathBuf, data: Vec<u8>) {
    match fs::write(&path, data) {
        Ok(()) => (),
        Err(why) => error!("Error writing {}: {}", path.display(), why),
    }
}
