//! Opening a rendered image with the platform viewer.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Hand the file to the platform opener. The viewer is detached; the
/// conversion does not wait for it to close.
pub fn open(path: &Path) -> io::Result<()> {
    let mut command = opener();
    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn opener() -> Command {
    Command::new("open")
}

#[cfg(target_os = "windows")]
fn opener() -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener() -> Command {
    Command::new("xdg-open")
}
