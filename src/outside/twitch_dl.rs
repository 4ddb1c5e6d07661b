use std::path::Path;

use miette::{bail, Context, IntoDiagnostic, Result};

use super::command::{assert_success_command, run_command, Capture, TWITCH_DL};

/// Quality asked to the downloader
pub const QUALITY: &str = "720p";

/// Interface for fetching clips and their metadata
pub trait ClipDownloader {
    /// Get the raw JSON metadata of the clip
    fn get_info(&self, url: &str) -> Result<String>;

    /// Download the clip media to the given path.
    ///
    /// An existing file at that path must not be overwritten.
    fn download(&self, url: &str, output: &Path) -> Result<()>;
}

/// Interface for the [twitch-dl](https://github.com/ihabunek/twitch-dl) program
#[derive(Debug)]
pub struct TwitchDl {
    program: String,
}

impl TwitchDl {
    /// Verify that the `twitch-dl` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(TWITCH_DL, |cmd| cmd.arg("--version"))
            .wrap_err("twitch-dl not found")?;

        Ok(Self {
            program: TWITCH_DL.to_owned(),
        })
    }
}

impl ClipDownloader for TwitchDl {
    fn get_info(&self, url: &str) -> Result<String> {
        let res = run_command(
            &self.program,
            |cmd| cmd.arg("info").arg(url).arg("--json"),
            Capture::STDOUT | Capture::STDERR,
            None,
        )?;

        if !res.status.success() {
            let stderr = String::from_utf8_lossy(&res.stderr);
            bail!("twitch-dl info failed: {}", stderr.trim());
        }

        String::from_utf8(res.stdout)
            .into_diagnostic()
            .wrap_err("Output from twitch-dl is not valid UTF-8")
    }

    fn download(&self, url: &str, output: &Path) -> Result<()> {
        let res = run_command(
            &self.program,
            |cmd| {
                cmd.arg("download")
                    .arg(url)
                    .args(["-q", QUALITY])
                    .arg("--output")
                    .arg(output)
            },
            Capture::STDERR,
            // Refuse to overwrite an existing file
            Some(b"n\n"),
        )?;

        if res.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&res.stderr);
            bail!("twitch-dl download failed: {}", stderr.trim())
        }
    }
}
