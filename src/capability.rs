/*
   Copyright (C) 2026 l5yth

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

//! Terminal capability detection.
//!
//! Environment reads go through [`EnvLookup`] so callers can probe a captured
//! [`Environ`] snapshot instead of the live process environment.

use std::{env, io::IsTerminal};

/// Terminal program identifiers known to render `OSC 9;4` progress bars.
const PROGRESS_TERMINALS: [&str; 1] = ["ghostty"];

/// Variable set inside Windows Terminal sessions.
const WT_SESSION: &str = "WT_SESSION";

/// Variable holding the terminal program identifier.
const TERM_PROGRAM: &str = "TERM_PROGRAM";

/// Read-only access to environment variables.
pub trait EnvLookup {
    /// Return the value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// Live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

/// Owned snapshot of `KEY=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ(Vec<(String, String)>);

impl Environ {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self(
            env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        )
    }

    /// Number of captured variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environ {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvLookup for Environ {
    fn var(&self, key: &str) -> Option<String> {
        // last assignment wins, matching how a shell would export duplicates
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

/// Report whether `stream` is attached to an interactive terminal.
pub fn is_terminal<S: IsTerminal>(stream: &S) -> bool {
    stream.is_terminal()
}

/// Decide whether a terminal can render the indeterminate progress overlay.
///
/// A non-terminal stream never qualifies. A terminal qualifies when the
/// terminal program identifier names a known supporting emulator, or when a
/// Windows Terminal session marker is present with any value.
pub fn supports_progress_overlay(is_tty: bool, env: &impl EnvLookup) -> bool {
    if !is_tty {
        return false;
    }
    let in_windows_terminal = env.var(WT_SESSION).is_some();
    let known_program = env
        .var(TERM_PROGRAM)
        .map(|p| p.to_ascii_lowercase())
        .is_some_and(|p| PROGRESS_TERMINALS.iter().any(|t| p.contains(t)));
    in_windows_terminal || known_program
}

/// Probe `stream` against the live process environment.
pub fn supports_progress_overlay_on<S: IsTerminal>(stream: &S) -> bool {
    supports_progress_overlay(is_terminal(stream), &ProcessEnv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environ {
        pairs.iter().copied().collect()
    }

    #[test]
    fn non_terminal_never_supports_overlay() {
        let envs = [
            env(&[]),
            env(&[("TERM_PROGRAM", "ghostty")]),
            env(&[("WT_SESSION", "abc")]),
            env(&[("TERM_PROGRAM", "Ghostty"), ("WT_SESSION", "")]),
        ];
        for e in &envs {
            assert!(!supports_progress_overlay(false, e));
        }
    }

    #[test]
    fn ghostty_matches_case_insensitively() {
        assert!(supports_progress_overlay(
            true,
            &env(&[("TERM_PROGRAM", "ghostty")])
        ));
        assert!(supports_progress_overlay(
            true,
            &env(&[("TERM_PROGRAM", "GhosTTY")])
        ));
        assert!(supports_progress_overlay(
            true,
            &env(&[("TERM_PROGRAM", "com.mitchellh.ghostty")])
        ));
    }

    #[test]
    fn windows_terminal_session_presence_is_enough() {
        assert!(supports_progress_overlay(
            true,
            &env(&[("WT_SESSION", "")])
        ));
        assert!(supports_progress_overlay(
            true,
            &env(&[("TERM_PROGRAM", "vscode"), ("WT_SESSION", "1234")])
        ));
    }

    #[test]
    fn terminal_without_signals_is_unsupported() {
        assert!(!supports_progress_overlay(true, &env(&[])));
        assert!(!supports_progress_overlay(
            true,
            &env(&[("TERM_PROGRAM", "Apple_Terminal"), ("TERM", "xterm-ghostty")])
        ));
    }

    #[test]
    fn environ_lookup_prefers_last_duplicate() {
        let e = env(&[("A", "1"), ("A", "2")]);
        assert_eq!(e.var("A").as_deref(), Some("2"));
        assert_eq!(e.var("B"), None);
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn captured_environ_sees_process_variables() {
        let captured = Environ::capture();
        if let Some(path) = ProcessEnv.var("PATH") {
            assert_eq!(captured.var("PATH"), Some(path));
        }
    }
}
