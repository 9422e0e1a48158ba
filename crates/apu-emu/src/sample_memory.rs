//! DPCM sample memory

// SPDX-FileCopyrightText: © 2025 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub const SAMPLE_MEMORY_START: u16 = 0xc000;

/// The sample bytes visible to the DPCM unit.
///
/// Reads are relative to `SAMPLE_MEMORY_START` and wrap inside the loaded sample.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleMemory {
    data: Vec<u8>,
}

impl SampleMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mem(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read(&self, address: u16) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let offset = usize::from(address.wrapping_sub(SAMPLE_MEMORY_START));
        self.data[offset % self.data.len()]
    }
}
