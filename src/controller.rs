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

//! The terminal controller: owns the grid, cursor, style, tab stops, parser, and PTY
//! channel, and is the only thing that mutates any of them.

use crate::cell::Cell;
use crate::error::Result;
use crate::grid::Grid;
use crate::parser::{ControlCode, LineClear, Parser, ParserEvent, ScreenClear};
use crate::pty::{PtyChannel, ReadOutcome};
use crate::style::Style;
use crate::tabstops::TabStops;
use crate::utf8::ClusterReassembler;

/// The embedder's callback surface. Invoked synchronously from inside
/// [`TerminalController::read`] and [`TerminalController::close`] — never from a
/// background thread, since this engine has none.
pub trait TerminalObserver {
    /// Fired before the first event of a non-empty parse pass.
    fn terminal_begin(&mut self);
    /// Fired after the last event of a parse pass.
    fn terminal_end(&mut self);
    /// Fired once, after `terminal_end`, if the pass mutated the grid or cursor.
    fn terminal_damage_all(&mut self);
    /// Fired once the child has been reaped, carrying its exit code.
    fn terminal_child_exited(&mut self, exit_code: i32);
}

/// Builds a [`TerminalController`], collecting the construction parameters described
/// in the data model before the one fallible step (forking the child).
#[derive(Debug, Clone)]
pub struct TerminalEngineBuilder {
    rows: u16,
    cols: u16,
    window_id: String,
    term: String,
    command: Vec<String>,
    extra_env: Vec<(String, String)>,
}

impl TerminalEngineBuilder {
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        TerminalEngineBuilder {
            rows,
            cols,
            window_id: String::new(),
            term: "xterm-256color".to_string(),
            command: Vec::new(),
            extra_env: Vec::new(),
        }
    }

    #[must_use]
    pub fn window_id(mut self, window_id: impl Into<String>) -> Self {
        self.window_id = window_id.into();
        self
    }

    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Sets the full command vector. An empty vector (the default) means "run the
    /// user's shell" — see [`crate::pty::resolve_command`].
    #[must_use]
    pub fn command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.command.push(arg.into());
        self
    }

    /// Adds an environment variable applied in the child on top of the fixed set
    /// (`LOGNAME`/`USER`/`SHELL`/`HOME`/`WINDOWID`/`TERM`) described in the PTY
    /// channel's setup contract.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    /// Forks the child and builds the controller.
    ///
    /// # Errors
    /// See [`TerminalController::new`].
    pub fn build<O: TerminalObserver>(self, observer: O) -> Result<TerminalController<O>> {
        TerminalController::new(
            observer,
            self.rows,
            self.cols,
            &self.window_id,
            &self.term,
            &self.command,
            &self.extra_env,
        )
    }
}

/// Owns every piece of mutable engine state and applies parser events to it.
#[derive(Debug)]
pub struct TerminalController<O: TerminalObserver> {
    grid: Grid,
    cursor_row: usize,
    cursor_col: usize,
    style: Style,
    tabstops: TabStops,
    parser: Parser,
    reassembler: ClusterReassembler,
    pty: PtyChannel,
    observer: O,
}

impl<O: TerminalObserver> TerminalController<O> {
    /// Forks `command` (or the default shell) behind a PTY of the given geometry and
    /// builds a controller around it. Prefer [`TerminalEngineBuilder`] for anything
    /// beyond the bare minimum.
    ///
    /// # Errors
    /// Returns [`crate::error::TerminalError::Setup`] if PTY/fork setup fails.
    pub fn new(
        observer: O,
        rows: u16,
        cols: u16,
        window_id: &str,
        term: &str,
        command: &[String],
        extra_env: &[(String, String)],
    ) -> Result<Self> {
        let pty = PtyChannel::spawn(rows, cols, window_id, term, command, extra_env)?;
        Ok(TerminalController {
            grid: Grid::new(rows as usize, cols as usize),
            cursor_row: 0,
            cursor_col: 0,
            style: Style::new(),
            tabstops: TabStops::new(cols as usize),
            parser: Parser::new(),
            reassembler: ClusterReassembler::new(),
            pty,
            observer,
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.pty.is_open()
    }

    #[must_use]
    pub fn fd(&self) -> i32 {
        self.pty.fd()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    #[must_use]
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    pub fn enqueue_write(&mut self, bytes: &[u8]) {
        self.pty.enqueue_write(bytes);
    }

    #[must_use]
    pub fn is_write_pending(&self) -> bool {
        self.pty.is_write_pending()
    }

    pub fn write(&mut self) {
        self.pty.write();
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.grid.resize(rows as usize, cols as usize);
        self.cursor_row = self.cursor_row.min(self.grid.rows() - 1);
        self.cursor_col = self.cursor_col.min(self.grid.cols() - 1);
        self.tabstops.reset(cols as usize);
        self.pty.resize(rows, cols);
    }

    /// Reads one chunk from the PTY and either runs a parse pass over it or, if the
    /// child has exited, notifies the observer.
    pub fn read(&mut self) {
        match self.pty.read() {
            ReadOutcome::Data(bytes) => self.dispatch_pass(&bytes),
            ReadOutcome::ChildExited(code) => self.observer.terminal_child_exited(code),
        }
    }

    /// Runs the PTY's shutdown ladder directly, without waiting for a failed read.
    /// Returns the child's exit code.
    pub fn close(&mut self) -> i32 {
        let code = self.pty.close();
        self.observer.terminal_child_exited(code);
        code
    }

    /// Builds a controller with no backing child, for feeding a synthetic byte
    /// stream through the real `dispatch_pass`/`apply_event` path in tests — see
    /// [`PtyChannel::for_test`].
    #[cfg(test)]
    pub(crate) fn for_test(observer: O, rows: u16, cols: u16) -> Self {
        TerminalController {
            grid: Grid::new(rows as usize, cols as usize),
            cursor_row: 0,
            cursor_col: 0,
            style: Style::new(),
            tabstops: TabStops::new(cols as usize),
            parser: Parser::new(),
            reassembler: ClusterReassembler::new(),
            pty: PtyChannel::for_test(),
            observer,
        }
    }

    /// Feeds a raw byte stream through the real dispatch path, for tests.
    #[cfg(test)]
    pub(crate) fn feed_for_test(&mut self, bytes: &[u8]) {
        self.dispatch_pass(bytes);
    }

    fn dispatch_pass(&mut self, bytes: &[u8]) {
        self.pty.begin_dispatch();
        self.observer.terminal_begin();

        let mut events = Vec::new();
        {
            let Self { parser, reassembler, .. } = self;
            reassembler.feed(bytes, |cluster| {
                parser.feed_cluster(cluster, &mut |event| events.push(event));
            });
        }

        let mut damaged = false;
        for event in events {
            if self.apply_event(event) {
                damaged = true;
            }
        }

        self.observer.terminal_end();
        if damaged {
            self.observer.terminal_damage_all();
        }
        self.pty.end_dispatch();
    }

    /// Applies one event, returning whether it mutated the grid or cursor (and thus
    /// requires a redraw).
    fn apply_event(&mut self, event: ParserEvent) -> bool {
        match event {
            ParserEvent::Control(code) => self.apply_control(code),
            ParserEvent::MoveCursor { row, col } => {
                self.set_cursor(row as usize, col as usize);
                true
            }
            ParserEvent::ClearLine(kind) => {
                self.clear_line(kind);
                true
            }
            ParserEvent::ClearScreen(kind) => {
                self.clear_screen(kind);
                true
            }
            ParserEvent::Text(cluster) => {
                self.put_text(cluster);
                true
            }
            ParserEvent::ResetStyle => {
                self.style.reset();
                false
            }
            ParserEvent::SetFg(fg) => {
                self.style.set_fg(fg);
                false
            }
            ParserEvent::SetBg(bg) => {
                self.style.set_bg(bg);
                false
            }
            ParserEvent::FgDefault => {
                self.style.fg_default();
                false
            }
            ParserEvent::BgDefault => {
                self.style.bg_default();
                false
            }
            ParserEvent::EnableAttr(attr) => {
                self.style.enable(attr);
                false
            }
            ParserEvent::DisableAttr(attr) => {
                self.style.disable(attr);
                false
            }
            ParserEvent::Mode { private, set, value } => {
                tracing::trace!(private, set, value, "terminal mode set/reset, no observable effect in this engine");
                false
            }
            ParserEvent::TabulationClear { value } => {
                tracing::trace!(value, "tabulation clear, no observable effect in this engine");
                false
            }
        }
    }

    fn apply_control(&mut self, code: ControlCode) -> bool {
        match code {
            ControlCode::Bel => {
                tracing::trace!("BEL received, no audible/visual bell in this engine");
                false
            }
            ControlCode::Ht => {
                let last_col = self.grid.cols() - 1;
                self.cursor_col = self.tabstops.next_stop_after(self.cursor_col).unwrap_or(last_col).min(last_col);
                true
            }
            ControlCode::Bs => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                    self.grid.erase_cell(self.cursor_row, self.cursor_col);
                }
                true
            }
            ControlCode::Cr => {
                self.cursor_col = 0;
                true
            }
            ControlCode::Lf => {
                self.cursor_col = 0;
                self.advance_line();
                true
            }
        }
    }

    fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.grid.rows() - 1);
        self.cursor_col = col.min(self.grid.cols() - 1);
    }

    fn clear_line(&mut self, kind: LineClear) {
        match kind {
            LineClear::Right => {
                for col in self.cursor_col + 1..self.grid.cols() {
                    self.grid.overwrite_cell(Cell::NULL, self.cursor_row, col);
                }
            }
            LineClear::Left => {
                for col in 0..self.cursor_col {
                    self.grid.overwrite_cell(Cell::NULL, self.cursor_row, col);
                }
            }
            LineClear::All => self.grid.clear_line(self.cursor_row),
        }
    }

    fn clear_screen(&mut self, kind: ScreenClear) {
        match kind {
            ScreenClear::Below => {
                for row in self.cursor_row + 1..self.grid.rows() {
                    self.grid.clear_line(row);
                }
            }
            ScreenClear::Above => {
                for row in 0..self.cursor_row {
                    self.grid.clear_line(row);
                }
            }
            ScreenClear::All => {
                self.grid.clear_all();
                self.cursor_row = 0;
                self.cursor_col = 0;
            }
        }
    }

    fn put_text(&mut self, cluster: crate::cell::Cluster) {
        let cell = Cell { cluster, attrs: self.style.attrs, fg: self.style.fg, bg: self.style.bg };
        self.grid.overwrite_cell(cell, self.cursor_row, self.cursor_col);
        self.cursor_col += 1;
        if self.cursor_col >= self.grid.cols() {
            self.cursor_col = 0;
            self.advance_line();
        }
    }

    /// Scrolls if the cursor is already on the last row, otherwise just moves down.
    fn advance_line(&mut self) {
        if self.cursor_row + 1 >= self.grid.rows() {
            self.grid.add_line();
        } else {
            self.cursor_row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellAttrs;

    /// An observer that only counts callbacks, for tests that care about grid state
    /// rather than the begin/end/damage bracket itself.
    #[derive(Debug, Default)]
    struct Recorder {
        begins: u32,
        ends: u32,
        damages: u32,
    }

    impl TerminalObserver for Recorder {
        fn terminal_begin(&mut self) {
            self.begins += 1;
        }
        fn terminal_end(&mut self) {
            self.ends += 1;
        }
        fn terminal_damage_all(&mut self) {
            self.damages += 1;
        }
        fn terminal_child_exited(&mut self, _exit_code: i32) {}
    }

    fn row_text(ctrl: &TerminalController<Recorder>, row: usize) -> Vec<u8> {
        ctrl.grid().line(row).cells().iter().map(|c| if c.is_null() { b'.' } else { c.cluster.as_bytes()[0] }).collect()
    }

    #[test]
    fn s1_plain_text_and_lf() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"hi\nok");
        assert_eq!(row_text(&ctrl, 0), b"hi........");
        assert_eq!(row_text(&ctrl, 1), b"ok........");
        assert_eq!((ctrl.cursor_row(), ctrl.cursor_col()), (1, 2));
    }

    #[test]
    fn s2_cr_overwrite() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"abc\rXY");
        assert_eq!(row_text(&ctrl, 0), b"XYc.......");
        assert_eq!((ctrl.cursor_row(), ctrl.cursor_col()), (0, 2));
    }

    #[test]
    fn s3_csi_cursor_address() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"A\x1b[2;4Hb");
        assert_eq!(row_text(&ctrl, 0), b"A.........");
        assert_eq!(row_text(&ctrl, 1), b"...b......");
        assert_eq!((ctrl.cursor_row(), ctrl.cursor_col()), (1, 4));
    }

    #[test]
    fn s4_sgr_fg_then_reset() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"\x1b[31mR\x1b[0mN");
        assert_eq!(ctrl.grid().cell(0, 0).fg, 1);
        assert_eq!(ctrl.grid().cell(0, 1).fg, 7);
        assert_eq!(ctrl.grid().cell(0, 0).attrs, CellAttrs::empty());
        assert_eq!(ctrl.grid().cell(0, 1).attrs, CellAttrs::empty());
    }

    #[test]
    fn s5_clear_screen_below() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"abc\n\x1b[2;1Hxy\x1b[0J");
        assert_eq!(row_text(&ctrl, 0), b"abc.......");
        assert_eq!(row_text(&ctrl, 1), b"xy........");
        for r in 2..5 {
            assert_eq!(row_text(&ctrl, r), b"..........");
        }
        assert_eq!((ctrl.cursor_row(), ctrl.cursor_col()), (1, 2));
    }

    #[test]
    fn s6_scroll_on_lf_at_bottom() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"a\nb\nc\nd\ne");
        ctrl.feed_for_test(b"\nf");
        let expected: [&[u8]; 5] = [b"b.........", b"c.........", b"d.........", b"e.........", b"f........."];
        for (r, exp) in expected.into_iter().enumerate() {
            assert_eq!(row_text(&ctrl, r), exp);
        }
        assert_eq!((ctrl.cursor_row(), ctrl.cursor_col()), (4, 1));
    }

    #[test]
    fn ht_clamps_to_last_column_when_no_further_stop() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"123456789\x09");
        assert_eq!(ctrl.cursor_col(), 9);
    }

    #[test]
    fn bs_at_column_zero_is_clamped() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"\x08");
        assert_eq!(ctrl.cursor_col(), 0);
    }

    #[test]
    fn resumable_parsing_matches_whole_feed() {
        let whole_input = b"abc\x1b[31mdef\x1b[0mghi";
        let mut whole = TerminalController::for_test(Recorder::default(), 5, 20);
        whole.feed_for_test(whole_input);

        let mut split = TerminalController::for_test(Recorder::default(), 5, 20);
        split.feed_for_test(&whole_input[..5]);
        split.feed_for_test(&whole_input[5..]);

        for r in 0..5 {
            assert_eq!(row_text(&whole, r), row_text(&split, r));
        }
        assert_eq!((whole.cursor_row(), whole.cursor_col()), (split.cursor_row(), split.cursor_col()));
    }

    #[test]
    fn style_only_change_does_not_mark_damage_but_text_does() {
        let mut ctrl = TerminalController::for_test(Recorder::default(), 5, 10);
        ctrl.feed_for_test(b"\x1b[31m");
        assert_eq!(ctrl.observer.damages, 0);
        ctrl.feed_for_test(b"x");
        assert_eq!(ctrl.observer.damages, 1);
    }
}
