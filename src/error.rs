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

//! Typed errors for the PTY setup path.
//!
//! Everything past setup follows a different policy: protocol errors are logged and
//! swallowed, write failures set a "dump writes" flag, and contract violations panic.
//! See the crate-level docs for the full breakdown.

use thiserror::Error;

/// Failures that can occur while standing up the child process and its PTY.
///
/// This is the only fallible surface the engine exposes to callers. Once setup
/// succeeds, the engine either recovers internally (protocol errors, write failures)
/// or treats the condition as a programming error (contract violations, which panic).
#[derive(Debug, Error)]
pub enum TerminalError {
    /// A system call during PTY/child setup failed.
    #[error("{syscall} failed: {source}")]
    Setup {
        /// Name of the failing syscall, e.g. `"openpty"`, `"fork"`, `"setsid"`.
        syscall: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Neither an explicit command nor `$SHELL`/`/bin/sh` could be resolved.
    ///
    /// In practice this cannot happen, since `/bin/sh` is the final fallback, but the
    /// builder models it so the construction path has an honest `Result` return.
    #[error("no command given and no usable shell could be resolved")]
    NoShellAvailable,
}

pub type Result<T> = std::result::Result<T, TerminalError>;

/// Wraps the last OS error into a [`TerminalError::Setup`] for the named syscall.
pub(crate) fn setup_errno(syscall: &'static str) -> TerminalError {
    TerminalError::Setup {
        syscall,
        source: std::io::Error::last_os_error(),
    }
}
