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

//! A terminal engine: PTY child lifecycle, a VT-style escape-sequence parser, and a
//! styled grid buffer with cursor and style state.
//!
//! This crate is the core of a graphical terminal emulator — not the window, the
//! font rasterizer, or the event loop. Those are the embedder's job; this crate
//! gives it a [`controller::TerminalController`] to drive and a
//! [`controller::TerminalObserver`] callback trait to implement.
//!
//! # Layout
//!
//! - [`utf8`] — classifies and reassembles UTF-8 byte clusters across reads.
//! - [`cell`] / [`style`] — the styled-cell and current-style-state data model.
//! - [`grid`] — the fixed-geometry screen buffer.
//! - [`tabstops`] — tab stop tracking.
//! - [`parser`] — the escape-sequence state machine, emitting [`parser::ParserEvent`].
//! - [`pty`] — PTY fork/exec, read/write, resize, and shutdown escalation.
//! - [`controller`] — owns all of the above and applies parser events to the grid.
//! - [`error`] — the typed construction/setup error surface.
//!
//! # Error handling policy
//!
//! Only PTY/fork setup is fallible to the caller ([`error::TerminalError`]). Once a
//! [`controller::TerminalController`] exists, malformed protocol input is logged via
//! `tracing` and absorbed, write failures degrade silently, and anything that would
//! indicate a bug in the caller (out-of-range grid access, re-entrant dispatch,
//! zero-sized geometry) panics rather than returning an error — these are
//! programming errors, not runtime conditions to recover from.

pub mod cell;
pub mod controller;
pub mod error;
pub mod grid;
pub mod parser;
pub mod pty;
pub mod style;
pub mod tabstops;
pub mod utf8;

pub use cell::{Cell, CellAttrs, Cluster};
pub use controller::{TerminalController, TerminalEngineBuilder, TerminalObserver};
pub use error::{Result, TerminalError};
pub use grid::{Grid, Line};
pub use parser::{ControlCode, LineClear, Parser, ParserEvent, ScreenClear};
pub use pty::{PtyChannel, ReadOutcome};
pub use style::Style;
pub use tabstops::TabStops;
