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

use std::process::Command;

#[test]
fn binary_help_and_version_exit_successfully() {
    let bin = env!("CARGO_BIN_EXE_tether");

    let help = Command::new(bin)
        .arg("--help")
        .output()
        .expect("run --help");
    assert!(help.status.success());
    let help_stdout = String::from_utf8_lossy(&help.stdout);
    assert!(help_stdout.contains("Usage: tether [OPTIONS]"));
    assert!(help_stdout.contains("--data-dir"));
    assert!(help_stdout.contains("--no-progress"));

    let version = Command::new(bin)
        .arg("--version")
        .output()
        .expect("run --version");
    assert!(version.status.success());
    let version_stdout = String::from_utf8_lossy(&version.stdout);
    assert!(version_stdout.contains(&format!("tether v{}", env!("CARGO_PKG_VERSION"))));
    assert!(version_stdout.contains("apache v2 (c) 2026 l5yth"));
}

#[test]
fn binary_rejects_unknown_arguments() {
    let bin = env!("CARGO_BIN_EXE_tether");
    let out = Command::new(bin)
        .arg("--bogus")
        .output()
        .expect("run --bogus");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown argument"));
}

#[test]
fn binary_reports_unusable_data_dir_without_starting_ui() {
    let bin = env!("CARGO_BIN_EXE_tether");
    let tmp = tempfile::tempdir().expect("tempdir");
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("write");

    let out = Command::new(bin)
        .arg("--cwd")
        .arg(tmp.path())
        .arg("--data-dir")
        .arg(&blocker)
        .arg("--no-progress")
        .output()
        .expect("run with blocked data dir");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("storage unavailable"));
}
