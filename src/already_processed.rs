use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::Path,
};

use miette::{bail, Context, IntoDiagnostic, Result};

/// Log of the clip URLs that have already been uploaded.
///
/// The file holds one URL per line and is only ever appended to.
/// It is read once when opened, membership checks are then done in memory.
pub struct AlreadyProcessed {
    urls: HashSet<String>,
    file: File,
    needs_newline: bool,
}

impl AlreadyProcessed {
    pub fn read_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not open processed log {}", path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .into_diagnostic()
            .wrap_err("Processed log is not valid UTF-8")?;

        let urls = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            urls,
            file,
            // A line written by hand may lack its terminator
            needs_newline: !content.is_empty() && !content.ends_with('\n'),
        })
    }

    /// Record the URL, in memory and on disk.
    pub fn push(&mut self, url: &str) -> Result<()> {
        if !self.urls.insert(url.to_owned()) {
            bail!("URL {url} is already in the processed log");
        }

        if std::mem::take(&mut self.needs_newline) {
            writeln!(self.file).into_diagnostic()?;
        }
        writeln!(self.file, "{url}")
            .into_diagnostic()
            .wrap_err("Could not append to the processed log")?;
        self.file.flush().into_diagnostic()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}
