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

//! Current style state: the foreground/background/attributes that new text is
//! stamped with until the next SGR sequence changes them.

use crate::cell::{CellAttrs, DEFAULT_BG, DEFAULT_FG};

/// The "pen" the terminal currently writes with. Mutated only by SGR dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: u8,
    pub bg: u8,
    pub attrs: CellAttrs,
}

impl Default for Style {
    fn default() -> Self {
        Style { fg: DEFAULT_FG, bg: DEFAULT_BG, attrs: CellAttrs::empty() }
    }
}

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// SGR 0: reset everything to the default pen.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_fg(&mut self, fg: u8) {
        self.fg = fg;
    }

    pub fn set_bg(&mut self, bg: u8) {
        self.bg = bg;
    }

    pub fn fg_default(&mut self) {
        self.fg = DEFAULT_FG;
    }

    pub fn bg_default(&mut self) {
        self.bg = DEFAULT_BG;
    }

    pub fn enable(&mut self, attr: CellAttrs) {
        self.attrs.insert(attr);
    }

    pub fn disable(&mut self, attr: CellAttrs) {
        self.attrs.remove(attr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_spec_defaults() {
        let s = Style::new();
        assert_eq!(s.fg, DEFAULT_FG);
        assert_eq!(s.bg, DEFAULT_BG);
        assert_eq!(s.attrs, CellAttrs::empty());
    }

    #[test]
    fn reset_clears_a_dirtied_style() {
        let mut s = Style::new();
        s.set_fg(1);
        s.set_bg(4);
        s.enable(CellAttrs::BOLD | CellAttrs::UNDERLINE);
        s.reset();
        assert_eq!(s, Style::default());
    }

    #[test]
    fn enable_disable_are_independent_per_attribute() {
        let mut s = Style::new();
        s.enable(CellAttrs::BOLD);
        s.enable(CellAttrs::ITALIC);
        s.disable(CellAttrs::BOLD);
        assert!(!s.attrs.contains(CellAttrs::BOLD));
        assert!(s.attrs.contains(CellAttrs::ITALIC));
    }
}
