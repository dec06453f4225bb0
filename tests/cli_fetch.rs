use assert_cmd::Command;

#[test]
fn cli_help_lists_overlay_flags() {
    let mut cmd = Command::cargo_bin("loader-fetch").unwrap();
    let assert = cmd.arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for flag in ["--out", "--title", "--description", "--completion-delay-ms", "--determinate", "--raw"] {
        assert!(out.contains(flag), "missing {flag} in help:\n{out}");
    }
}

#[test]
fn cli_rejects_non_http_url() {
    let mut cmd = Command::cargo_bin("loader-fetch").unwrap();
    let assert = cmd.arg("ftp://example.com/file").assert().failure();
    let err = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(err.contains("http:// or https://"), "stderr was: {err}");
}

#[test]
fn cli_requires_a_url() {
    let mut cmd = Command::cargo_bin("loader-fetch").unwrap();
    cmd.assert().failure();
}

#[test]
fn cli_rejects_bad_delay() {
    let mut cmd = Command::cargo_bin("loader-fetch").unwrap();
    cmd.args(["http://localhost", "--completion-delay-ms", "soon"])
        .assert()
        .failure();
}
