//! Tracker module pattern compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod newtype_macros;

pub mod channel_map;
pub mod commands;
pub mod compiler_log;
pub mod data;
pub mod driver_constants;
pub mod effects;
pub mod errors;
pub mod export;
pub mod module;
pub mod notes;
pub mod pattern_compiler;
pub mod rows;
pub mod sound_chips;

pub use channel_map::{ChannelId, ChannelMap};
pub use compiler_log::{CompilerLog, StderrLog, VecLog};
pub use module::Module;
pub use pattern_compiler::{CompiledPattern, CompilerOptions, PatternCompiler};
pub use sound_chips::{SoundChip, SoundChipSet};
