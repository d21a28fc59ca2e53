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

//! CSI (`ESC [ ... final`) parameter parsing and dispatch.

use crate::parser::event::{LineClear, ParserEvent, ScreenClear};
use crate::parser::sgr;

/// Splits a semicolon-separated run of decimal digits into parameters, each
/// defaulting to `0` when its segment is empty (e.g. `"1;;3"` -> `[1, 0, 3]`).
///
/// Stops at the first byte that is neither an ASCII digit nor `;`; bytes past that
/// point are not part of this subset's supported intermediates and are dropped.
#[must_use]
pub fn parse_params(bytes: &[u8]) -> Vec<u16> {
    let mut params = Vec::new();
    let mut current: Option<u32> = None;
    for &b in bytes {
        match b {
            b'0'..=b'9' => {
                let digit = u32::from(b - b'0');
                current = Some(current.unwrap_or(0) * 10 + digit);
            }
            b';' => params.push(current.take().unwrap_or(0)),
            _ => break,
        }
    }
    params.push(current.take().unwrap_or(0));
    params.into_iter().map(|v| v.min(u32::from(u16::MAX)) as u16).collect()
}

/// Dispatches a complete CSI sequence. `buf` holds every byte collected since
/// `ESC [`, including the final byte, but not the `ESC [` itself.
pub fn dispatch(buf: &[u8], emit: &mut impl FnMut(ParserEvent)) {
    let Some((&mode, body)) = buf.split_last() else {
        tracing::warn!("empty CSI sequence, nothing to dispatch");
        return;
    };
    let (private, params_bytes) = match body.split_first() {
        Some((b'?', rest)) => (true, rest),
        _ => (false, body),
    };
    let params = parse_params(params_bytes);

    match mode {
        b'h' | b'l' => emit(ParserEvent::Mode {
            private,
            set: mode == b'h',
            value: params.first().copied().unwrap_or(0),
        }),
        b'H' | b'f' => {
            let row = to_zero_based(params.first().copied().unwrap_or(0));
            let col = to_zero_based(params.get(1).copied().unwrap_or(0));
            emit(ParserEvent::MoveCursor { row, col });
        }
        b'J' => match params.first().copied().unwrap_or(0) {
            0 => emit(ParserEvent::ClearScreen(ScreenClear::Below)),
            1 => emit(ParserEvent::ClearScreen(ScreenClear::Above)),
            2 => emit(ParserEvent::ClearScreen(ScreenClear::All)),
            other => tracing::warn!(other, "unrecognized CSI J argument"),
        },
        b'K' => match params.first().copied().unwrap_or(0) {
            0 => emit(ParserEvent::ClearLine(LineClear::Right)),
            1 => emit(ParserEvent::ClearLine(LineClear::Left)),
            2 => emit(ParserEvent::ClearLine(LineClear::All)),
            other => tracing::warn!(other, "unrecognized CSI K argument"),
        },
        b'm' => sgr::dispatch(&params, emit),
        b'g' => emit(ParserEvent::TabulationClear { value: params.first().copied().unwrap_or(0) }),
        other => {
            tracing::warn!(mode = other as char, ?params, private, "unrecognized CSI final byte");
        }
    }
}

/// A param of `0` (explicit or omitted) means "default to 1"; everything else is
/// taken literally. Either way the result is converted to the engine's 0-based
/// coordinate system.
fn to_zero_based(param: u16) -> u16 {
    if param == 0 {
        0
    } else {
        param - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_params_splits_on_semicolons() {
        assert_eq!(parse_params(b"1;2;3"), vec![1, 2, 3]);
    }

    #[test]
    fn parse_params_defaults_empty_segments_to_zero() {
        assert_eq!(parse_params(b"1;;3"), vec![1, 0, 3]);
    }

    #[test]
    fn parse_params_on_empty_input_is_a_single_zero() {
        assert_eq!(parse_params(b""), vec![0]);
    }

    fn collect(buf: &[u8]) -> Vec<ParserEvent> {
        let mut out = Vec::new();
        dispatch(buf, &mut |e| out.push(e));
        out
    }

    #[test]
    fn cursor_position_defaults_to_origin() {
        assert_eq!(collect(b"H"), vec![ParserEvent::MoveCursor { row: 0, col: 0 }]);
    }

    #[test]
    fn cursor_position_is_one_based_in_the_wire_format() {
        assert_eq!(collect(b"3;5H"), vec![ParserEvent::MoveCursor { row: 2, col: 4 }]);
    }

    #[test]
    fn clear_screen_variants() {
        assert_eq!(collect(b"J"), vec![ParserEvent::ClearScreen(ScreenClear::Below)]);
        assert_eq!(collect(b"1J"), vec![ParserEvent::ClearScreen(ScreenClear::Above)]);
        assert_eq!(collect(b"2J"), vec![ParserEvent::ClearScreen(ScreenClear::All)]);
    }

    #[test]
    fn clear_line_variants() {
        assert_eq!(collect(b"K"), vec![ParserEvent::ClearLine(LineClear::Right)]);
        assert_eq!(collect(b"1K"), vec![ParserEvent::ClearLine(LineClear::Left)]);
        assert_eq!(collect(b"2K"), vec![ParserEvent::ClearLine(LineClear::All)]);
    }

    #[test]
    fn private_mode_prefix_is_recognized() {
        assert_eq!(
            collect(b"?25h"),
            vec![ParserEvent::Mode { private: true, set: true, value: 25 }]
        );
        assert_eq!(
            collect(b"?25l"),
            vec![ParserEvent::Mode { private: true, set: false, value: 25 }]
        );
    }

    #[test]
    fn sgr_delegates_to_the_sgr_module() {
        assert_eq!(collect(b"31m"), vec![ParserEvent::SetFg(1)]);
    }
}
