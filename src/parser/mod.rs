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

//! The escape-sequence state machine. Feed it UTF-8 clusters one at a time; it
//! emits [`event::ParserEvent`]s to whatever sink you give it — a
//! [`crate::controller::TerminalController`] in production, a `Vec` in tests.
//!
//! The parser holds no grid, cursor, or style state of its own: that ownership sits
//! entirely with the controller, so the parser can be driven and tested in isolation.

pub mod csi;
pub mod event;
pub mod sgr;

use crate::cell::Cluster;
pub use event::{ControlCode, LineClear, ParserEvent, ScreenClear};

/// Upper bound on a CSI sequence's parameter/intermediate bytes. A sequence that
/// grows past this without hitting its final byte is almost certainly garbage (or an
/// adversarial input) and is dropped rather than grown without bound.
const CSI_BUF_CAP: usize = 64;

/// Upper bound on an OSC/DCS/APC/PM string payload. Past this the payload is
/// discarded; the terminator (BEL or ST) is still honored so the parser resyncs.
const STRING_BUF_CAP: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    EscStart,
    Csi,
    StringSeq,
    StringEsc,
    /// Swallows exactly one byte after `ESC #`, e.g. the DEC screen-alignment test.
    Test,
}

/// The escape-sequence state machine described at the top of this module.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    csi_buf: Vec<u8>,
    string_type: u8,
    string_buf: Vec<u8>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Parser { state: State::Normal, csi_buf: Vec::new(), string_type: 0, string_buf: Vec::new() }
    }

    /// Feeds one already-reassembled UTF-8 cluster (see [`crate::utf8`]) through the
    /// state machine, calling `emit` for each resulting event.
    pub fn feed_cluster(&mut self, cluster: &[u8], emit: &mut impl FnMut(ParserEvent)) {
        if cluster.len() > 1 {
            self.feed_multibyte(cluster, emit);
            return;
        }
        let byte = cluster[0];
        match self.state {
            State::Normal => self.handle_normal(byte, emit),
            State::EscStart => self.handle_esc_start(byte),
            State::Csi => self.handle_csi(byte, emit),
            State::StringSeq => self.handle_string(byte, emit),
            State::StringEsc => self.handle_string_esc(byte, emit),
            State::Test => self.state = State::Normal,
        }
    }

    /// A decoded multi-byte cluster is always text — there is no multi-byte escape
    /// introducer in this subset. Outside `NORMAL` it's either passed through with a
    /// warning (mid-CSI/mid-escape garbage) or silently dropped (mid-STRING, where
    /// arbitrary payload bytes are expected). Either way the current state survives:
    /// the interjected text doesn't abandon an in-progress sequence.
    fn feed_multibyte(&mut self, cluster: &[u8], emit: &mut impl FnMut(ParserEvent)) {
        match self.state {
            State::Normal => emit(ParserEvent::Text(Cluster::from_slice(cluster))),
            State::StringSeq => {}
            other => {
                tracing::warn!(state = ?other, "multi-byte cluster mid-sequence; treating as text");
                emit(ParserEvent::Text(Cluster::from_slice(cluster)));
            }
        }
    }

    fn handle_normal(&mut self, byte: u8, emit: &mut impl FnMut(ParserEvent)) {
        match byte {
            0x07 => emit(ParserEvent::Control(ControlCode::Bel)),
            0x08 => emit(ParserEvent::Control(ControlCode::Bs)),
            0x09 => emit(ParserEvent::Control(ControlCode::Ht)),
            0x0A | 0x0B | 0x0C => emit(ParserEvent::Control(ControlCode::Lf)),
            0x0D => emit(ParserEvent::Control(ControlCode::Cr)),
            0x1B => self.state = State::EscStart,
            0x00..=0x1F | 0x7F => tracing::trace!(byte, "ignored C0 control byte"),
            _ => emit(ParserEvent::Text(Cluster::from_slice(&[byte]))),
        }
    }

    fn handle_esc_start(&mut self, byte: u8) {
        match byte {
            b'[' => {
                self.csi_buf.clear();
                self.state = State::Csi;
            }
            b'#' => self.state = State::Test,
            b'P' | b'_' | b'^' | b']' | b'k' => {
                self.string_type = byte;
                self.string_buf.clear();
                self.state = State::StringSeq;
            }
            _ => {
                tracing::trace!(escape = byte as char, "single-byte escape, no observable effect in this subset");
                self.state = State::Normal;
            }
        }
    }

    fn handle_csi(&mut self, byte: u8, emit: &mut impl FnMut(ParserEvent)) {
        match byte {
            0x40..=0x7E => {
                self.csi_buf.push(byte);
                csi::dispatch(&self.csi_buf, emit);
                self.csi_buf.clear();
                self.state = State::Normal;
            }
            0x20..=0x3F => {
                if self.csi_buf.len() >= CSI_BUF_CAP {
                    tracing::warn!("CSI sequence exceeded buffer cap, abandoning");
                    self.csi_buf.clear();
                    self.state = State::Normal;
                } else {
                    self.csi_buf.push(byte);
                }
            }
            _ => {
                tracing::warn!(byte, "malformed CSI sequence, dropping");
                self.csi_buf.clear();
                self.state = State::Normal;
            }
        }
    }

    fn handle_string(&mut self, byte: u8, emit: &mut impl FnMut(ParserEvent)) {
        match byte {
            0x1B => self.state = State::StringEsc,
            0x07 => {
                self.dispatch_string();
                self.state = State::Normal;
            }
            _ => {
                if self.string_buf.len() >= STRING_BUF_CAP {
                    tracing::warn!("string sequence exceeded buffer cap, discarding");
                    self.string_buf.clear();
                    self.state = State::Normal;
                } else {
                    self.string_buf.push(byte);
                }
            }
        }
        let _ = emit; // string sequences have no observable effect in this subset
    }

    fn handle_string_esc(&mut self, byte: u8, emit: &mut impl FnMut(ParserEvent)) {
        if byte == b'\\' {
            self.dispatch_string();
        } else {
            tracing::trace!("string sequence abandoned: ST not completed");
            self.string_buf.clear();
        }
        self.state = State::Normal;
        let _ = emit;
    }

    fn dispatch_string(&mut self) {
        tracing::trace!(
            kind = self.string_type as char,
            len = self.string_buf.len(),
            "string sequence terminated, no observable effect in this subset"
        );
        self.string_buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8]) -> Vec<ParserEvent> {
        let mut parser = Parser::new();
        let mut reassembler = crate::utf8::ClusterReassembler::new();
        let mut events = Vec::new();
        reassembler.feed(input, |cluster| parser.feed_cluster(cluster, &mut |e| events.push(e)));
        events
    }

    #[test]
    fn plain_ascii_is_forwarded_as_text() {
        let events = run(b"hi");
        assert_eq!(
            events,
            vec![
                ParserEvent::Text(Cluster::from_slice(b"h")),
                ParserEvent::Text(Cluster::from_slice(b"i")),
            ]
        );
    }

    #[test]
    fn multibyte_utf8_is_reassembled_before_reaching_the_parser() {
        let events = run("é".as_bytes());
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice("é".as_bytes()))]);
    }

    #[test]
    fn c0_controls_are_recognized() {
        let events = run(b"\x07\x08\x09\x0D\x0A");
        assert_eq!(
            events,
            vec![
                ParserEvent::Control(ControlCode::Bel),
                ParserEvent::Control(ControlCode::Bs),
                ParserEvent::Control(ControlCode::Ht),
                ParserEvent::Control(ControlCode::Cr),
                ParserEvent::Control(ControlCode::Lf),
            ]
        );
    }

    #[test]
    fn csi_sequence_split_across_feeds_still_dispatches() {
        let mut parser = Parser::new();
        let mut events = Vec::new();
        parser.feed_cluster(b"\x1b", &mut |e| events.push(e));
        parser.feed_cluster(b"[", &mut |e| events.push(e));
        parser.feed_cluster(b"3", &mut |e| events.push(e));
        parser.feed_cluster(b"1", &mut |e| events.push(e));
        parser.feed_cluster(b"m", &mut |e| events.push(e));
        assert_eq!(events, vec![ParserEvent::SetFg(1)]);
    }

    #[test]
    fn text_around_an_escape_sequence_is_preserved() {
        let events = run(b"a\x1b[31mb");
        assert_eq!(
            events,
            vec![
                ParserEvent::Text(Cluster::from_slice(b"a")),
                ParserEvent::SetFg(1),
                ParserEvent::Text(Cluster::from_slice(b"b")),
            ]
        );
    }

    #[test]
    fn osc_string_terminated_by_bel_produces_no_events() {
        let events = run(b"\x1b]0;title\x07x");
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice(b"x"))]);
    }

    #[test]
    fn osc_string_terminated_by_st_produces_no_events() {
        let events = run(b"\x1b]0;title\x1b\\x");
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice(b"x"))]);
    }

    #[test]
    fn malformed_csi_recovers_to_normal_state() {
        let events = run(b"\x1b[\x01a");
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice(b"a"))]);
    }

    #[test]
    fn oversized_csi_sequence_is_abandoned_and_recovers() {
        let mut input = Vec::from(*b"\x1b[");
        input.extend(std::iter::repeat(b'0').take(CSI_BUF_CAP + 10));
        input.push(b'm');
        input.push(b'x');
        let events = run(&input);
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice(b"x"))]);
    }

    #[test]
    fn test_sequence_swallows_one_byte() {
        let events = run(b"\x1b#8x");
        assert_eq!(events, vec![ParserEvent::Text(Cluster::from_slice(b"x"))]);
    }
}
