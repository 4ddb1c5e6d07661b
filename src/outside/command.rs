use std::{
    io::{ErrorKind, Write},
    process::{Command, Output, Stdio},
};

use bitflags::bitflags;
use miette::{bail, Context, IntoDiagnostic, Result};
use tracing::{debug, enabled, trace, Level};

pub const TWITCH_DL: &str = "twitch-dl";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capture: u8 {
        const STDOUT = 0b0000010;
        const STDERR = 0b0000100;
    }
}

/// Run a command, returning its raw output handle.
///
/// Output handles will be captured only if the caller required it or if the log level is Debug.
/// In that last case, `stdout` and `stderr` will be logged.
///
/// If `input` is given, it is written to the program `stdin`, which is then closed.
/// Otherwise `stdin` is null, so that prompts see an immediate end of file.
///
/// The function returns an error only if the command failed to execute.
/// If the program runs but returns a non-0 status code, it will not trigger an error.
pub fn run_command<F: FnOnce(&mut Command) -> &mut Command>(
    program: &str,
    f: F,
    capture: Capture,
    input: Option<&[u8]>,
) -> Result<Output> {
    let is_debug = enabled!(Level::DEBUG);
    let get_io = |capture| {
        if capture {
            Stdio::piped()
        } else {
            Stdio::null()
        }
    };

    let mut cmd = Command::new(program);
    let cmd = f(&mut cmd)
        .stdin(get_io(input.is_some()))
        .stdout(get_io(is_debug || capture.contains(Capture::STDOUT)))
        .stderr(get_io(is_debug || capture.contains(Capture::STDERR)));

    debug!("Executing command: {cmd:?}");
    let mut child = cmd
        .spawn()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not run {program}"))?;

    if let Some(input) = input {
        // Dropping the handle closes the pipe
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input) {
                // The program exited without reading its input
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                res => res
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Could not write to {program} stdin"))?,
            }
        }
    }

    let res = child
        .wait_with_output()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not wait for {program}"))?;

    if is_debug {
        debug!("status: {}", res.status);
        debug!("stdout: {} bytes long", res.stdout.len());
        trace!("stdout: {:?}", String::from_utf8_lossy(&res.stdout));
        debug!("stderr: {} bytes long", res.stderr.len());
        trace!("stderr: {:?}", String::from_utf8_lossy(&res.stderr));
    }

    Ok(res)
}

/// Run the command and verify that it has returned a success status code.
pub fn assert_success_command<F: FnOnce(&mut Command) -> &mut Command>(
    program: &str,
    f: F,
) -> Result<()> {
    let res = run_command(program, f, Capture::empty(), None)?;
    if res.status.success() {
        Ok(())
    } else {
        bail!("{program} did run but was not successful")
    }
}
