#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

pub const REQUESTED_HEADER: &str = "incentive_level, pay_band, rate";
pub const PAY_RATE_HEADER: &str = "incentive_level, pay_band, start_date, end_date, rate";

/// Writes `lines` to a temporary CSV file.
pub fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

/// A `reconcile` command for activity 1 at prison MDI with STD/ENH levels and bands 1-3.
pub fn reconcile_cmd(requested: &NamedTempFile, today: &str) -> Command {
    let mut cmd = Command::new(cargo_bin!("payrates"));
    cmd.arg("reconcile")
        .arg("--requested")
        .arg(requested.path())
        .arg("--today")
        .arg(today)
        .arg("--incentive-levels")
        .arg("STD,ENH")
        .arg("--pay-bands")
        .arg("1,2,3");
    cmd
}
