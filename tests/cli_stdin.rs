#![cfg(feature = "cli")]

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use rowbinary::{PointRow, RowWriter};

fn dump(args: &[&str], input: Vec<u8>) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rowbinary-dump"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    let mut stdin = child.stdin.take().expect("stdin");
    let feeder = thread::spawn(move || stdin.write_all(&input));
    let output = child.wait_with_output().expect("wait");
    // `--limit` may exit before the whole input is consumed.
    match feeder.join().expect("join") {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
        Err(err) => panic!("feed stdin: {err}"),
    }
    output
}

#[test]
fn dumps_every_row_from_piped_stdin() {
    let mut writer = RowWriter::new();
    for i in 0..1000u32 {
        PointRow::new("a.b", f64::from(i), 1_700_000_000 + i, 1_700_000_000 + i)
            .write_to(&mut writer)
            .expect("write");
    }

    let output = dump(&[], writer.into_inner());
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1000);
    assert_eq!(lines[0], "a.b 0 1700000000");
    assert_eq!(lines[999], "a.b 999 1700000999");
}

#[test]
fn reversed_paths_and_limit() {
    let mut writer = RowWriter::new();
    for i in 0..5u32 {
        PointRow::new("carbon.agents.host1", 1.5, 60 * i, 60 * i)
            .write_to(&mut writer)
            .expect("write");
    }

    let output = dump(&["--reverse-paths", "--limit", "2"], writer.into_inner());
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "host1.agents.carbon 1.5 0\nhost1.agents.carbon 1.5 60\n");
}

#[test]
fn print_config_emits_defaults() {
    let output = dump(&["--print-config"], Vec::new());
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let config = rowbinary::ReaderConfig::from_json_str(&stdout).expect("parse");
    assert_eq!(config, rowbinary::ReaderConfig::default());
}

#[test]
fn truncated_stdin_fails() {
    let mut writer = RowWriter::new();
    PointRow::new("a.b", 1.0, 60, 60)
        .write_to(&mut writer)
        .expect("write");
    let mut bytes = writer.into_inner();
    bytes.truncate(bytes.len() - 1);

    let output = dump(&[], bytes);
    assert!(!output.status.success());
}
