/*
 *   Copyright (c) 2026 The vt_engine Authors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! A single styled grid cell.

use bitflags::bitflags;

bitflags! {
    /// Per-cell rendition attributes set by SGR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellAttrs: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const BLINK     = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// Default foreground palette index (ANSI white).
pub const DEFAULT_FG: u8 = 7;
/// Default background palette index (ANSI black).
pub const DEFAULT_BG: u8 = 0;

/// A UTF-8 byte cluster of at most 4 bytes, stored inline to avoid a heap
/// allocation per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    bytes: [u8; 4],
    len: u8,
}

impl Cluster {
    /// The empty cluster — the null cell's glyph, rendered as a space.
    pub const EMPTY: Cluster = Cluster { bytes: [0; 4], len: 0 };

    /// Builds a cluster from a byte slice of length 1..=4.
    ///
    /// # Panics
    /// Panics if `slice` is empty or longer than 4 bytes — both are contract
    /// violations, since callers only ever pass clusters already classified by
    /// [`crate::utf8::lead_length`].
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        assert!(
            !slice.is_empty() && slice.len() <= 4,
            "cluster length must be 1..=4, got {}",
            slice.len()
        );
        let mut bytes = [0u8; 4];
        bytes[..slice.len()].copy_from_slice(slice);
        Cluster { bytes, len: slice.len() as u8 }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::EMPTY
    }
}

/// A single grid cell: a glyph cluster plus the style it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub cluster: Cluster,
    pub attrs: CellAttrs,
    pub fg: u8,
    pub bg: u8,
}

impl Cell {
    /// The null cell: empty cluster, default style.
    pub const NULL: Cell = Cell {
        cluster: Cluster::EMPTY,
        attrs: CellAttrs::empty(),
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
    };

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.cluster.is_empty()
    }
}

impl Default for Cell {
    /// A derived `Default` would give `fg = 0`, silently diverging from
    /// [`Cell::NULL`]'s `fg = DEFAULT_FG`. Delegate instead.
    fn default() -> Self {
        Cell::NULL
    }
}
