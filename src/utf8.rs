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

//! UTF-8 cluster slicing over a byte stream that may be split across reads.
//!
//! This does not validate continuation bytes — a malformed cluster is passed through
//! verbatim, the same as a real terminal would forward garbage bytes rather than
//! reject them.

/// Returns the expected byte length of the UTF-8 cluster starting with `byte`.
///
/// Any leading byte that isn't a valid ASCII/2/3/4-byte lead is treated as a single
/// latin-1 passthrough byte rather than rejected.
#[must_use]
pub fn lead_length(byte: u8) -> usize {
    if byte & 0b1000_0000 == 0b0000_0000 {
        1
    } else if byte & 0b1110_0000 == 0b1100_0000 {
        2
    } else if byte & 0b1111_0000 == 0b1110_0000 {
        3
    } else if byte & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        1
    }
}

/// Reassembles complete UTF-8 clusters from a byte stream delivered in arbitrary
/// chunks, holding back an incomplete trailing cluster until more bytes arrive.
#[derive(Debug, Default)]
pub struct ClusterReassembler {
    pending: Vec<u8>,
}

impl ClusterReassembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` to the pending buffer and invokes `on_cluster` once per
    /// complete cluster found, in stream order. Any incomplete tail is retained for
    /// the next call.
    pub fn feed(&mut self, bytes: &[u8], mut on_cluster: impl FnMut(&[u8])) {
        self.pending.extend_from_slice(bytes);

        let mut i = 0;
        while i != self.pending.len() {
            let len = lead_length(self.pending[i]);
            if self.pending.len() < i + len {
                break;
            }
            on_cluster(&self.pending[i..i + len]);
            i += len;
        }
        self.pending.drain(0..i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_length_classifies_ascii() {
        assert_eq!(lead_length(b'a'), 1);
        assert_eq!(lead_length(0x7f), 1);
    }

    #[test]
    fn lead_length_classifies_multibyte_leads() {
        assert_eq!(lead_length(0b1100_0010), 2);
        assert_eq!(lead_length(0b1110_0010), 3);
        assert_eq!(lead_length(0b1111_0000), 4);
    }

    #[test]
    fn lead_length_passes_through_invalid_lead() {
        assert_eq!(lead_length(0b1111_1000), 1);
        assert_eq!(lead_length(0xff), 1);
    }

    #[test]
    fn whole_cluster_dispatched_in_one_call() {
        let mut r = ClusterReassembler::new();
        let mut seen = Vec::new();
        r.feed("héllo".as_bytes(), |c| seen.push(c.to_vec()));
        assert_eq!(seen[1], "é".as_bytes());
    }

    #[test]
    fn cluster_split_across_feeds_is_held_back() {
        let bytes = "é".as_bytes(); // 2-byte cluster
        let mut r = ClusterReassembler::new();
        let mut seen = Vec::new();
        r.feed(&bytes[..1], |c| seen.push(c.to_vec()));
        assert!(seen.is_empty(), "incomplete cluster must not dispatch yet");
        r.feed(&bytes[1..], |c| seen.push(c.to_vec()));
        assert_eq!(seen, vec![bytes.to_vec()]);
    }

    #[test]
    fn resumable_regardless_of_split_point() {
        let stream = b"ab\xe4\xb8\xadcd".to_vec(); // "ab" + CJK + "cd"
        for split in 0..=stream.len() {
            let mut r = ClusterReassembler::new();
            let mut whole = Vec::new();
            r.feed(&stream[..split], |c| whole.push(c.to_vec()));
            r.feed(&stream[split..], |c| whole.push(c.to_vec()));
            let flat: Vec<u8> = whole.into_iter().flatten().collect();
            assert_eq!(flat, stream, "split at {split} produced a different stream");
        }
    }
}
