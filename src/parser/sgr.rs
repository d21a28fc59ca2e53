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

//! SGR (`CSI ... m`) dispatch: turns a parameter list into style-mutation events.

use crate::cell::CellAttrs;
use crate::parser::event::ParserEvent;

/// Applies SGR parameters left-to-right, emitting one event per recognized code.
///
/// An empty parameter list (bare `CSI m`) is equivalent to `CSI 0 m`.
pub fn dispatch(params: &[u16], emit: &mut impl FnMut(ParserEvent)) {
    if params.is_empty() {
        emit(ParserEvent::ResetStyle);
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let code = params[i];
        match code {
            0 => emit(ParserEvent::ResetStyle),
            1 => emit(ParserEvent::EnableAttr(CellAttrs::BOLD)),
            3 => emit(ParserEvent::EnableAttr(CellAttrs::ITALIC)),
            4 => emit(ParserEvent::EnableAttr(CellAttrs::UNDERLINE)),
            5 | 6 => emit(ParserEvent::EnableAttr(CellAttrs::BLINK)),
            7 => emit(ParserEvent::EnableAttr(CellAttrs::REVERSE)),
            21 | 22 => emit(ParserEvent::DisableAttr(CellAttrs::BOLD)),
            23 => emit(ParserEvent::DisableAttr(CellAttrs::ITALIC)),
            24 => emit(ParserEvent::DisableAttr(CellAttrs::UNDERLINE)),
            25 | 26 => emit(ParserEvent::DisableAttr(CellAttrs::BLINK)),
            27 => emit(ParserEvent::DisableAttr(CellAttrs::REVERSE)),
            30..=37 => emit(ParserEvent::SetFg((code - 30) as u8)),
            39 => emit(ParserEvent::FgDefault),
            40..=47 => emit(ParserEvent::SetBg((code - 40) as u8)),
            49 => emit(ParserEvent::BgDefault),
            90..=97 => emit(ParserEvent::SetFg((code - 90 + 8) as u8)),
            100..=107 => emit(ParserEvent::SetBg((code - 100 + 8) as u8)),
            38 | 48 => {
                i += dispatch_extended_color(code, &params[i + 1..], emit);
            }
            other => tracing::warn!(code = other, "unrecognized SGR code"),
        }
        i += 1;
    }
}

/// Handles the `38;5;N` / `48;5;N` extended-color forms. Returns the number of extra
/// params consumed beyond the `38`/`48` code itself, so the caller can skip past them.
fn dispatch_extended_color(code: u16, rest: &[u16], emit: &mut impl FnMut(ParserEvent)) -> usize {
    match rest {
        [5, n, ..] => {
            if *n < 256 {
                if code == 38 {
                    emit(ParserEvent::SetFg(*n as u8));
                } else {
                    emit(ParserEvent::SetBg(*n as u8));
                }
            } else {
                tracing::warn!(n, "SGR {code};5;N index out of range");
            }
            2
        }
        _ => {
            tracing::warn!(code, ?rest, "unsupported SGR extended-color form");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(params: &[u16]) -> Vec<ParserEvent> {
        let mut out = Vec::new();
        dispatch(params, &mut |e| out.push(e));
        out
    }

    #[test]
    fn empty_params_means_reset() {
        assert_eq!(collect(&[]), vec![ParserEvent::ResetStyle]);
    }

    #[test]
    fn basic_fg_bg() {
        assert_eq!(collect(&[31]), vec![ParserEvent::SetFg(1)]);
        assert_eq!(collect(&[44]), vec![ParserEvent::SetBg(4)]);
    }

    #[test]
    fn bright_fg_bg() {
        assert_eq!(collect(&[93]), vec![ParserEvent::SetFg(11)]);
        assert_eq!(collect(&[104]), vec![ParserEvent::SetBg(12)]);
    }

    #[test]
    fn extended_256_color() {
        assert_eq!(collect(&[38, 5, 200]), vec![ParserEvent::SetFg(200)]);
        assert_eq!(collect(&[48, 5, 17]), vec![ParserEvent::SetBg(17)]);
    }

    #[test]
    fn multiple_codes_applied_in_order() {
        assert_eq!(
            collect(&[31, 1, 4]),
            vec![
                ParserEvent::SetFg(1),
                ParserEvent::EnableAttr(CellAttrs::BOLD),
                ParserEvent::EnableAttr(CellAttrs::UNDERLINE),
            ]
        );
    }

    #[test]
    fn attribute_disable_codes() {
        assert_eq!(collect(&[22]), vec![ParserEvent::DisableAttr(CellAttrs::BOLD)]);
        assert_eq!(collect(&[27]), vec![ParserEvent::DisableAttr(CellAttrs::REVERSE)]);
    }
}
