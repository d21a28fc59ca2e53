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

//! Semantic events the parser hands to its sink — the terminal controller in
//! production, a recording stub in tests.

use crate::cell::{CellAttrs, Cluster};

/// A C0 control code the parser recognizes and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    Bel,
    Ht,
    Bs,
    Cr,
    Lf,
}

/// `CSI K` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClear {
    Right,
    Left,
    All,
}

/// `CSI J` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenClear {
    Below,
    Above,
    All,
}

/// One semantic event produced by a single pass over the parser's input.
///
/// Events are emitted in stream order between a pass's begin/end brackets (owned by
/// the controller, not modeled here — see [`crate::controller::TerminalController`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserEvent {
    Control(ControlCode),
    /// Absolute cursor move, already converted to 0-based coordinates. May be out of
    /// grid range; the sink is responsible for clamping.
    MoveCursor { row: u16, col: u16 },
    ClearLine(LineClear),
    ClearScreen(ScreenClear),
    /// A printable glyph cluster to stamp at the cursor with the current style.
    Text(Cluster),

    /// SGR 0.
    ResetStyle,
    SetFg(u8),
    SetBg(u8),
    FgDefault,
    BgDefault,
    EnableAttr(CellAttrs),
    DisableAttr(CellAttrs),

    /// `CSI h`/`CSI l` — mode set/reset. Not observable beyond a log in this subset.
    Mode { private: bool, set: bool, value: u16 },
    /// `CSI g` — tabulation clear. Not observable beyond a log in this subset.
    TabulationClear { value: u16 },
}
