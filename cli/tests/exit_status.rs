use std::process::{Command, Output};

fn satledger(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_satledger")).args(args).env_remove("RUST_LOG").output().unwrap()
}

#[test]
fn test_success_prints_to_stdout() {
    let output = satledger(&["encode", "253"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "fdfd00");
}

#[test]
fn test_failure_is_reported_when_logging_is_off() {
    let output = satledger(&["--loglevel", "off", "encode", "-1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("value -1 is not representable"), "{stderr}");
}

#[test]
fn test_failure_is_logged() {
    let output = satledger(&["select", "--target", "5000", "a:0:500"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("insufficient funds"));
}
