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

//! Child-side environment and signal setup, run after `fork()` and before `execvp`.
//!
//! Everything here runs between `fork` and `exec` in the child, so it is restricted
//! to async-signal-safe libc calls only — no allocation beyond `CString`, no
//! `std::env`, no locking.

use std::ffi::CString;

/// Environment variables unset in the child before exec.
const UNSET_VARS: [&str; 3] = ["COLUMNS", "LINES", "TERMCAP"];

/// Clears the variables a real terminal always clears for its child, then applies
/// the password-database-derived identity plus the fixed `WINDOWID`/`TERM` pair.
///
/// `SHELL` and `HOME` are only set if the child doesn't already have them (some
/// password database entries are incomplete); `LOGNAME`, `USER`, `WINDOWID`, `TERM`
/// are always overwritten.
pub(crate) fn setup_child_env(window_id: &str, term: &str) {
    for var in UNSET_VARS {
        unsafe_unsetenv(var);
    }

    if let Some(pw) = lookup_passwd_entry() {
        unsafe_setenv("LOGNAME", &pw.name);
        unsafe_setenv("USER", &pw.name);
        if std::env::var_os("SHELL").is_none() {
            unsafe_setenv("SHELL", &pw.shell);
        }
        if std::env::var_os("HOME").is_none() {
            unsafe_setenv("HOME", &pw.home);
        }
    }

    unsafe_setenv("WINDOWID", window_id);
    unsafe_setenv("TERM", term);
}

/// Applies caller-supplied environment overrides, on top of the fixed set
/// [`setup_child_env`] already applied. Later entries win on duplicate keys, same as
/// repeated `setenv` calls.
pub(crate) fn apply_extra_env(vars: &[(String, String)]) {
    for (key, value) in vars {
        unsafe_setenv(key, value);
    }
}

/// Resets the dispositions a terminal child must not inherit from the parent.
pub(crate) fn reset_child_signals() {
    for sig in [libc::SIGCHLD, libc::SIGHUP, libc::SIGINT, libc::SIGQUIT, libc::SIGTERM, libc::SIGALRM] {
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
        }
    }
}

struct PasswdEntry {
    name: String,
    shell: String,
    home: String,
}

/// Looks up the current effective user's password-database entry via `getpwuid`.
/// Returns `None` if the lookup fails (no such entry, or the fields aren't valid
/// UTF-8) — the caller degrades gracefully rather than treating this as fatal.
fn lookup_passwd_entry() -> Option<PasswdEntry> {
    let uid = unsafe { libc::getuid() };
    let pw = unsafe { libc::getpwuid(uid) };
    if pw.is_null() {
        return None;
    }
    unsafe {
        let name = cstr_to_string((*pw).pw_name)?;
        let shell = cstr_to_string((*pw).pw_shell)?;
        let home = cstr_to_string((*pw).pw_dir)?;
        Some(PasswdEntry { name, shell, home })
    }
}

unsafe fn cstr_to_string(ptr: *const libc::c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    std::ffi::CStr::from_ptr(ptr).to_str().ok().map(str::to_owned)
}

fn unsafe_setenv(key: &str, value: &str) {
    let Ok(k) = CString::new(key) else { return };
    let Ok(v) = CString::new(value) else { return };
    unsafe {
        libc::setenv(k.as_ptr(), v.as_ptr(), 1);
    }
}

fn unsafe_unsetenv(key: &str) {
    let Ok(k) = CString::new(key) else { return };
    unsafe {
        libc::unsetenv(k.as_ptr());
    }
}
