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

//! PTY lifecycle: fork a child behind a pseudo-terminal, and drive its descriptor
//! with non-blocking read/write plus a bounded shutdown escalation.

mod env;

use std::collections::VecDeque;
use std::ffi::CString;
use std::os::fd::{AsRawFd, OwnedFd};
use std::time::{Duration, Instant};

use crate::error::{setup_errno, Result, TerminalError};

/// Budget given to each stage of the shutdown signal ladder before escalating.
const REAP_POLL_BUDGET: Duration = Duration::from_millis(100);
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What a single [`PtyChannel::read`] produced.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Bytes read from the child, to be fed through the UTF-8/parser pipeline.
    Data(Vec<u8>),
    /// The child is gone. The channel has already run its shutdown ladder and is
    /// closed; this carries the exit code to surface via `terminal_child_exited`.
    ChildExited(i32),
}

/// Owns the PTY master descriptor and the forked child's PID, plus the queued-write
/// and re-entrancy-guard state described in the data model.
#[derive(Debug)]
pub struct PtyChannel {
    master: Option<OwnedFd>,
    child_pid: libc::pid_t,
    write_queue: VecDeque<u8>,
    dump_writes: bool,
    dispatching: bool,
    open: bool,
}

impl PtyChannel {
    /// Forks a child attached to a fresh PTY and execs `command` (or the default
    /// shell if empty) inside it.
    ///
    /// # Errors
    /// Returns [`TerminalError::Setup`] if `openpty`, `fork`, or the window-size
    /// `ioctl` fails. Once the child is forked, further failures are the child's
    /// problem alone (it exits 127 on a failed exec; see [`TerminalError`] docs).
    pub fn spawn(
        rows: u16,
        cols: u16,
        window_id: &str,
        term: &str,
        command: &[String],
        extra_env: &[(String, String)],
    ) -> Result<Self> {
        let argv = resolve_command(command)?;

        let pair = rustix_openpty::openpty(None, None).map_err(|_| setup_errno("openpty"))?;
        let master = pair.controller;
        let slave = pair.user;

        let winsize = rustix_openpty::rustix::termios::Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let ioctl_ret = unsafe {
            libc::ioctl(slave.as_raw_fd(), libc::TIOCSWINSZ, std::ptr::from_ref(&winsize).cast::<libc::c_void>())
        };
        if ioctl_ret < 0 {
            return Err(setup_errno("ioctl(TIOCSWINSZ)"));
        }

        let slave_raw = slave.as_raw_fd();
        let master_raw = master.as_raw_fd();

        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(setup_errno("fork"));
        }

        if pid == 0 {
            exec_child(slave_raw, master_raw, window_id, term, &argv, extra_env);
            unreachable!("exec_child never returns");
        }

        drop(slave);
        Ok(PtyChannel {
            master: Some(master),
            child_pid: pid,
            write_queue: VecDeque::new(),
            dump_writes: false,
            dispatching: false,
            open: true,
        })
    }

    /// A channel with no backing child or descriptor, for driving a controller's
    /// dispatch logic against a synthetic byte stream in tests. `begin_dispatch`/
    /// `end_dispatch` only ever touch `dispatching`, so this is sufficient for that —
    /// nothing that needs a real descriptor (`fd`, `read`, `write`, `resize`) is
    /// reachable through it.
    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        PtyChannel {
            master: None,
            child_pid: 0,
            write_queue: VecDeque::new(),
            dump_writes: false,
            dispatching: false,
            open: false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The master descriptor, for the embedder's own readiness multiplexing.
    ///
    /// # Panics
    /// Panics if the channel is already closed.
    #[must_use]
    pub fn fd(&self) -> i32 {
        self.master.as_ref().expect("fd() called on a closed PtyChannel").as_raw_fd()
    }

    /// Set by the controller for the duration of a parse pass; every other public
    /// method on this type asserts it is clear.
    pub(crate) fn begin_dispatch(&mut self) {
        self.dispatching = true;
    }

    pub(crate) fn end_dispatch(&mut self) {
        self.dispatching = false;
    }

    fn assert_not_dispatching(&self) {
        assert!(!self.dispatching, "PtyChannel API called re-entrantly during a parse pass");
    }

    /// Reads up to 4096 bytes. A `-1` return from the underlying syscall means the
    /// child is gone: this runs the full shutdown ladder before returning.
    ///
    /// # Panics
    /// Panics on a zero-byte read — a live PTY never produces EOF, only `-1`.
    pub fn read(&mut self) -> ReadOutcome {
        self.assert_not_dispatching();
        let fd = self.fd();
        let mut buf = [0u8; 4096];
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        match n.cmp(&0) {
            std::cmp::Ordering::Equal => unreachable!("PTY read() returned EOF; expected -1 on child exit"),
            std::cmp::Ordering::Less => ReadOutcome::ChildExited(self.close()),
            std::cmp::Ordering::Greater => ReadOutcome::Data(buf[..n as usize].to_vec()),
        }
    }

    /// Appends to the write queue, unless a previous write already failed
    /// irrecoverably (`dump_writes`), in which case the bytes are silently dropped.
    pub fn enqueue_write(&mut self, bytes: &[u8]) {
        self.assert_not_dispatching();
        if self.dump_writes {
            return;
        }
        self.write_queue.extend(bytes.iter().copied());
    }

    #[must_use]
    pub fn is_write_pending(&self) -> bool {
        self.assert_not_dispatching();
        !self.write_queue.is_empty()
    }

    /// Writes as much of the front of the queue as the syscall accepts. On failure,
    /// sets `dump_writes` and drops the rest of the queue — the child exit will
    /// surface on the next `read()`.
    pub fn write(&mut self) {
        self.assert_not_dispatching();
        if self.write_queue.is_empty() {
            return;
        }
        let fd = self.fd();
        let pending = self.write_queue.make_contiguous();
        let n = unsafe { libc::write(fd, pending.as_ptr().cast(), pending.len()) };
        if n < 0 {
            tracing::debug!("PTY write failed, dropping pending writes (child likely gone)");
            self.dump_writes = true;
            self.write_queue.clear();
        } else {
            self.write_queue.drain(..n as usize);
        }
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.assert_not_dispatching();
        let winsize = rustix_openpty::rustix::termios::Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        unsafe {
            libc::ioctl(self.fd(), libc::TIOCSWINSZ, std::ptr::from_ref(&winsize).cast::<libc::c_void>());
        }
    }

    /// The shutdown protocol: close the master, then escalate
    /// `CONT, PIPE, [reap], INT, TERM, QUIT, KILL, [reap]`, each signal stage given
    /// [`REAP_POLL_BUDGET`] to succeed before moving to the next. Idempotent: calling
    /// this again on an already-closed channel is a no-op returning 0.
    pub fn close(&mut self) -> i32 {
        if !self.open {
            return 0;
        }
        self.open = false;
        self.master.take();

        self.send_signal(libc::SIGCONT);
        self.send_signal(libc::SIGPIPE);
        if let Some(code) = self.poll_reap() {
            return code;
        }
        for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGQUIT, libc::SIGKILL] {
            self.send_signal(sig);
            if let Some(code) = self.poll_reap() {
                return code;
            }
        }
        self.blocking_reap()
    }

    fn send_signal(&self, sig: i32) {
        unsafe {
            libc::kill(self.child_pid, sig);
        }
    }

    fn try_reap(&self) -> Option<i32> {
        let mut status = 0;
        let ret = unsafe { libc::waitpid(self.child_pid, &mut status, libc::WNOHANG) };
        (ret == self.child_pid).then(|| exit_code_from_status(status))
    }

    fn poll_reap(&self) -> Option<i32> {
        let start = Instant::now();
        while start.elapsed() < REAP_POLL_BUDGET {
            if let Some(code) = self.try_reap() {
                return Some(code);
            }
            std::thread::sleep(REAP_POLL_INTERVAL);
        }
        None
    }

    fn blocking_reap(&self) -> i32 {
        let mut status = 0;
        unsafe {
            libc::waitpid(self.child_pid, &mut status, 0);
        }
        exit_code_from_status(status)
    }
}

impl Drop for PtyChannel {
    fn drop(&mut self) {
        if self.open {
            self.close();
        }
    }
}

fn exit_code_from_status(status: i32) -> i32 {
    if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else {
        libc::EXIT_FAILURE
    }
}

/// Resolves the argv to exec: `command` verbatim if non-empty, else `$SHELL -i`
/// (falling back to `/bin/sh -i`).
pub(crate) fn resolve_command(command: &[String]) -> Result<Vec<String>> {
    if !command.is_empty() {
        return Ok(command.to_vec());
    }
    let shell = std::env::var("SHELL").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "/bin/sh".to_string());
    if shell.is_empty() {
        return Err(TerminalError::NoShellAvailable);
    }
    Ok(vec![shell, "-i".to_string()])
}

/// Runs entirely in the forked child between `fork()` and `execvp()`: never returns.
///
/// Both raw descriptors are closed after `dup2` — the inherited PTY master, and the
/// slave's own original fd number (now duplicated onto 0/1/2) — so neither leaks into
/// the exec'd program, which inherits every non-`CLOEXEC` fd across `execvp`.
fn exec_child(slave: libc::c_int, master: libc::c_int, window_id: &str, term: &str, argv: &[String], extra_env: &[(String, String)]) -> ! {
    unsafe {
        libc::setsid();
        libc::ioctl(slave, libc::TIOCSCTTY as libc::c_ulong, 0);
        libc::dup2(slave, 0);
        libc::dup2(slave, 1);
        libc::dup2(slave, 2);
        libc::close(slave);
        libc::close(master);
    }

    env::setup_child_env(window_id, term);
    env::apply_extra_env(extra_env);
    env::reset_child_signals();

    let cstrings: Vec<CString> = argv.iter().map(|s| CString::new(s.as_str()).unwrap_or_default()).collect();
    let mut argv_ptrs: Vec<*const libc::c_char> = cstrings.iter().map(|s| s.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());

    unsafe {
        libc::execvp(argv_ptrs[0], argv_ptrs.as_ptr());
        libc::_exit(127);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_command_passes_through_explicit_command() {
        let cmd = vec!["/usr/bin/env".to_string(), "true".to_string()];
        assert_eq!(resolve_command(&cmd).unwrap(), cmd);
    }

    #[test]
    fn resolve_command_falls_back_to_bin_sh_when_shell_unset() {
        // SAFETY: test runs single-threaded within this process's test harness.
        let prior = std::env::var("SHELL").ok();
        unsafe {
            std::env::remove_var("SHELL");
        }
        assert_eq!(resolve_command(&[]).unwrap(), vec!["/bin/sh".to_string(), "-i".to_string()]);
        if let Some(value) = prior {
            unsafe {
                std::env::set_var("SHELL", value);
            }
        }
    }
}
