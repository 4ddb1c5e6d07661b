use std::{
    io::BufRead,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use miette::{miette, Context, IntoDiagnostic};
use tracing::{debug, info, warn};

use super::{cookies, Clicked, Page, Selector};
use crate::{
    pipeline::Uploader,
    result::{Error, Result},
    types::Clip,
};

const LOGIN_URL: &str = "https://youtube.com";

/// Text shown by the upload form once the daily quota is used
const QUOTA_MESSAGE: &str = "Daily upload limit reached";

/// Line appended to every description, after the channel name
const PROMO_LINE: &str = "Live Stream Fails (LSF) clip";

/// How long the session waits for the pages
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Pause after loading the site before and after logging in
    pub login: Duration,
    /// Pause letting the upload form settle after a navigation or a step change
    pub settle: Duration,
    /// Maximum wait for the form fields to become visible
    pub fields: Duration,
    /// Interval between two checks of the upload progress
    pub progress_interval: Duration,
    pub progress_attempts: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            login: Duration::from_secs(3),
            settle: Duration::from_secs(2),
            fields: Duration::from_secs(20),
            progress_interval: Duration::from_secs(1),
            progress_attempts: 120,
        }
    }
}

/// An authenticated browser session on the video platform, uploading clips
/// to a single channel.
pub struct UploadSession<P: Page> {
    page: P,
    channel_id: String,
    pacing: Pacing,
    closed: bool,
}

impl<P: Page> UploadSession<P> {
    /// Log into the platform.
    ///
    /// If no cookies file exists yet, the user is asked to log in by hand in the
    /// browser and to confirm on `prompt`. The session cookies are then saved to
    /// the file. Otherwise, the saved cookies are loaded in the browser.
    pub fn open<R: BufRead>(
        page: P,
        channel_id: &str,
        cookies_file: &Path,
        pacing: Pacing,
        mut prompt: R,
    ) -> miette::Result<Self> {
        page.goto(LOGIN_URL)?;
        thread::sleep(pacing.login);

        if cookies_file.exists() {
            let cookies = cookies::load(cookies_file)?;
            debug!("Loading {} cookies", cookies.len());
            for cookie in &cookies {
                page.add_cookie(cookie)?;
            }
        } else {
            warn!(
                "No cookies file at {}. Log in to your YouTube account in the browser, then press ENTER",
                cookies_file.display()
            );
            let mut line = String::new();
            prompt
                .read_line(&mut line)
                .into_diagnostic()
                .wrap_err("Could not read the login confirmation")?;

            let cookies = page.cookies()?;
            cookies::save(cookies_file, &cookies)?;
            info!("Saved {} cookies to {}", cookies.len(), cookies_file.display());
        }
        thread::sleep(pacing.login);

        Ok(Self {
            page,
            channel_id: channel_id.to_owned(),
            pacing,
            closed: false,
        })
    }

    /// Close the browser. Closing an already closed session does nothing.
    pub fn close(&mut self) -> miette::Result<()> {
        if std::mem::replace(&mut self.closed, true) {
            return Ok(());
        }
        self.page.close()
    }

    fn upload_url(&self) -> String {
        format!(
            "https://studio.youtube.com/channel/{}/videos?d=ud",
            self.channel_id
        )
    }

    fn click(&mut self, element: &P::Element) -> Result<()> {
        match self.page.click(element)? {
            Clicked::Done => Ok(()),
            Clicked::Intercepted => Err(self.intercepted()),
        }
    }

    fn click_id(&mut self, id: &str) -> Result<()> {
        let element = self.page.find(Selector::Id(id))?;
        self.click(&element)
    }

    /// Find out why a click did not reach its target
    fn intercepted(&mut self) -> Error {
        let message = self
            .page
            .find(Selector::Class("error-area"))
            .and_then(|area| self.page.text(&area))
            .unwrap_or_default();

        if message.contains(QUOTA_MESSAGE) {
            warn!("Daily limit reached! Terminating...");
            if let Err(err) = self.close() {
                warn!("{err:?}");
            }
            Error::QuotaExceeded
        } else {
            miette!("Click intercepted. Error area: {:?}", message.trim()).into()
        }
    }

    fn select_file(&mut self, path: &Path) -> Result<()> {
        let input = self
            .page
            .find_where(Selector::Tag("input"), |page, e| {
                Ok(page.attribute(e, "type")?.as_deref() == Some("file"))
            })?
            .ok_or_else(|| miette!("No file input on the upload page"))?;

        let path = absolute(path)?;
        self.page.send_keys(&input, &path.to_string_lossy())?;
        Ok(())
    }

    fn edit_metadata(&mut self, clip: &Clip) -> Result<()> {
        let fields = self
            .page
            .wait_all_visible(Selector::Id("textbox"), self.pacing.fields)?;
        let [title, description, ..] = fields.as_slice() else {
            return Err(miette!("Expected title and description fields, found {}", fields.len()).into());
        };

        self.click(title)?;
        self.page.replace_text(title, &clip.title())?;

        self.click(description)?;
        self.page
            .send_keys(description, &format!("{}\n{PROMO_LINE}", clip.channel()))?;
        Ok(())
    }

    fn fill_tags(&mut self, clip: &Clip) -> Result<()> {
        self.click_id("toggle-button")?;

        let inputs = self
            .page
            .wait_all_visible(Selector::Id("text-input"), self.pacing.fields)?;
        let mut tags_input = None;
        for input in inputs {
            if self.page.attribute(&input, "aria-label")?.as_deref() == Some("Tags") {
                tags_input = Some(input);
                break;
            }
        }

        match tags_input {
            Some(input) => {
                let tags = format!("{},", clip.tags.join(","));
                self.page.send_keys(&input, &tags)?;
            }
            None => warn!("No tags field found, uploading without tags"),
        }
        Ok(())
    }

    /// Wait until the second progress label appears, telling the upload is done.
    /// Return whether it appeared.
    fn wait_progress(&mut self) -> Result<bool> {
        for attempt in 0..self.pacing.progress_attempts {
            if self.page.find_all(Selector::Class("progress-label"))?.len() > 1 {
                debug!("Upload completed after {attempt} checks");
                return Ok(true);
            }
            thread::sleep(self.pacing.progress_interval);
        }
        Ok(false)
    }
}

impl<P: Page> Uploader for UploadSession<P> {
    fn upload(&mut self, clip: &Clip) -> Result<()> {
        if self.closed {
            return Err(miette!("The browser session is closed").into());
        }

        self.page.goto(&self.upload_url())?;
        thread::sleep(self.pacing.settle);

        self.select_file(&clip.path)?;
        self.edit_metadata(clip)?;
        self.fill_tags(clip)?;

        self.click_id("step-badge-3")?;
        thread::sleep(self.pacing.settle);
        self.click_id("done-button")?;

        let name = clip.path.display();
        info!("Uploading: {name}");
        if self.wait_progress()? {
            info!("Uploaded: {name}");
        } else {
            warn!("No completion seen for {name}, assuming it finishes in the background");
        }
        Ok(())
    }
}

impl<P: Page> Drop for UploadSession<P> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("{err:?}");
        }
    }
}

fn absolute(path: &Path) -> miette::Result<PathBuf> {
    path.canonicalize()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not find {}", path.display()))
}
