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

//! Tab stop positions, reset to every 8th column on construction and resize.

/// A boolean vector of length `cols`; `stops[i]` is set if column `i` is a tab stop.
#[derive(Debug, Clone)]
pub struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    /// Builds the default tab-stop layout: a stop at every column where
    /// `(i + 1) % 8 == 0`.
    #[must_use]
    pub fn new(cols: usize) -> Self {
        TabStops { stops: (0..cols).map(|i| (i + 1) % 8 == 0).collect() }
    }

    /// Rebuilds the default layout for a new column count, e.g. after a resize.
    pub fn reset(&mut self, cols: usize) {
        *self = Self::new(cols);
    }

    /// The next tab stop strictly to the right of `col`, or `None` if there isn't one.
    #[must_use]
    pub fn next_stop_after(&self, col: usize) -> Option<usize> {
        (col + 1..self.stops.len()).find(|&i| self.stops[i])
    }

    pub fn clear(&mut self, col: usize) {
        if let Some(s) = self.stops.get_mut(col) {
            *s = false;
        }
    }

    pub fn clear_all(&mut self) {
        self.stops.iter_mut().for_each(|s| *s = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stops_every_eighth_column() {
        let t = TabStops::new(20);
        let stops: Vec<usize> = (0..20).filter(|&i| t.next_stop_after(i.wrapping_sub(1)) == Some(i)).collect();
        // Easiest to check via next_stop_after from -1 equivalent (col usize::MAX would
        // underflow, so just probe directly).
        assert_eq!(t.next_stop_after(0), Some(7));
        assert_eq!(stops.first(), Some(&7));
    }

    #[test]
    fn next_stop_after_finds_the_next_set_column() {
        let t = TabStops::new(20);
        assert_eq!(t.next_stop_after(0), Some(7));
        assert_eq!(t.next_stop_after(7), Some(15));
        assert_eq!(t.next_stop_after(15), None, "20 cols: next stop after 15 would be 23, out of range");
    }

    #[test]
    fn reset_rebuilds_for_new_column_count() {
        let mut t = TabStops::new(10);
        t.clear_all();
        assert_eq!(t.next_stop_after(0), None);
        t.reset(16);
        assert_eq!(t.next_stop_after(0), Some(7));
    }
}
