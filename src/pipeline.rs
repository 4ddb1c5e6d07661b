use std::{fs, path::Path};

use miette::{Context, IntoDiagnostic};
use tracing::{debug, error, info, warn};

use crate::{
    already_processed::AlreadyProcessed,
    fetcher::ClipFetcher,
    filter,
    outside::ClipDownloader,
    result::{Error, Result},
    types::{Clip, Post},
};

/// Interface for publishing a downloaded clip
pub trait Uploader {
    /// Upload the clip file with its title, description and tags.
    ///
    /// Fail with [Error::QuotaExceeded] when the platform refuses any more uploads.
    fn upload(&mut self, clip: &Clip) -> Result<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counters {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every post has been considered
    Completed(Counters),
    /// The upload quota ran out, the remaining posts were not considered
    QuotaExhausted(Counters),
}

/// Process the posts in order: filter, download, upload, record.
///
/// Only a failure to record an uploaded clip stops the loop with an error.
pub fn run<D: ClipDownloader, U: Uploader>(
    posts: &[Post],
    processed: &mut AlreadyProcessed,
    fetcher: &ClipFetcher<D>,
    uploader: &mut U,
) -> miette::Result<RunOutcome> {
    let mut counters = Counters::default();

    for post in posts {
        let clip = match filter::check(post, processed).and_then(|()| fetcher.fetch(post)) {
            Ok(clip) => clip,
            Err(skip) => {
                if skip.is_routine() {
                    debug!("Skipping {}: {skip}", post.url);
                } else {
                    warn!("Skipping {}: {skip}", post.url);
                }
                counters.skipped += 1;
                continue;
            }
        };

        let res = uploader.upload(&clip);
        remove_clip(&clip.path);

        match res {
            Ok(()) => {
                processed
                    .push(&clip.url)
                    .wrap_err("Could not record the uploaded clip")?;
                counters.uploaded += 1;
            }
            Err(Error::QuotaExceeded) => {
                warn!("Upload quota exhausted, stopping");
                return Ok(RunOutcome::QuotaExhausted(counters));
            }
            Err(err) => {
                let err = err.wrap_err_with(|| format!("Could not upload {}", post.url));
                error!("{:?}", miette::Report::from(err));
                counters.failed += 1;
            }
        }
    }

    info!(
        "{} uploaded, {} skipped, {} failed",
        counters.uploaded, counters.skipped, counters.failed
    );
    Ok(RunOutcome::Completed(counters))
}

fn remove_clip(path: &Path) {
    if let Err(err) = fs::remove_file(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not delete {}", path.display()))
    {
        warn!("{err:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use miette::miette;

    use super::*;
    use crate::fetcher::tests::{FakeDownloader, INFO};

    #[derive(Clone, Copy)]
    enum Answer {
        Ok,
        Quota,
        Broken,
    }

    /// Uploader giving the scripted answers, in order
    struct ScriptedUploader {
        answers: Vec<Answer>,
        uploaded: Vec<PathBuf>,
    }

    impl ScriptedUploader {
        fn new(answers: &[Answer]) -> Self {
            Self {
                answers: answers.to_vec(),
                uploaded: vec![],
            }
        }
    }

    impl Uploader for ScriptedUploader {
        fn upload(&mut self, clip: &Clip) -> Result<()> {
            assert!(clip.path.exists(), "clip must be on disk while uploading");
            self.uploaded.push(clip.path.clone());
            match self.answers.remove(0) {
                Answer::Ok => Ok(()),
                Answer::Quota => Err(Error::QuotaExceeded),
                Answer::Broken => Err(miette!("Click intercepted").into()),
            }
        }
    }

    fn post(title: &str, url: &str) -> Post {
        Post {
            title: title.to_owned(),
            url: url.to_owned(),
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        log_path: PathBuf,
        processed: AlreadyProcessed,
        fetcher: ClipFetcher<FakeDownloader>,
    }

    fn fixture(already: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("data.txt");
        fs::write(&log_path, already).unwrap();
        let processed = AlreadyProcessed::read_or_create(&log_path).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let fetcher = ClipFetcher::new(FakeDownloader::with_info(INFO), &out);

        Fixture {
            dir,
            log_path,
            processed,
            fetcher,
        }
    }

    fn out_files(fixture: &Fixture) -> usize {
        fs::read_dir(fixture.dir.path().join("out")).unwrap().count()
    }

    #[test]
    fn success_records_url_and_deletes_file() {
        let mut fx = fixture("https://clips.twitch.tv/Old\n");
        let posts = [post("Clip Title", "https://clips.twitch.tv/New")];
        let mut uploader = ScriptedUploader::new(&[Answer::Ok]);

        let outcome = run(&posts, &mut fx.processed, &fx.fetcher, &mut uploader).unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(Counters {
                uploaded: 1,
                skipped: 0,
                failed: 0
            })
        );
        assert_eq!(
            fs::read_to_string(&fx.log_path).unwrap(),
            "https://clips.twitch.tv/Old\nhttps://clips.twitch.tv/New\n"
        );
        assert!(!uploader.uploaded[0].exists());
        assert_eq!(out_files(&fx), 0);
    }

    #[test]
    fn quota_stops_without_recording() {
        let mut fx = fixture("");
        let posts = [
            post("First", "https://clips.twitch.tv/A"),
            post("Second", "https://clips.twitch.tv/B"),
        ];
        let mut uploader = ScriptedUploader::new(&[Answer::Quota, Answer::Ok]);

        let outcome = run(&posts, &mut fx.processed, &fx.fetcher, &mut uploader).unwrap();

        assert!(matches!(outcome, RunOutcome::QuotaExhausted(_)));
        assert_eq!(uploader.uploaded.len(), 1);
        assert!(!uploader.uploaded[0].exists());
        assert_eq!(fs::read_to_string(&fx.log_path).unwrap(), "");
        assert!(!fx.processed.contains("https://clips.twitch.tv/A"));
    }

    #[test]
    fn skips_and_failures_continue() {
        let mut fx = fixture("https://clips.twitch.tv/Done\n");
        let posts = [
            post("Not a clip", "https://v.redd.it/x"),
            post("Done", "https://clips.twitch.tv/Done"),
            post("Broken", "https://clips.twitch.tv/Broken"),
            post("Fine", "https://clips.twitch.tv/Fine"),
        ];
        let mut uploader = ScriptedUploader::new(&[Answer::Broken, Answer::Ok]);

        let outcome = run(&posts, &mut fx.processed, &fx.fetcher, &mut uploader).unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(Counters {
                uploaded: 1,
                skipped: 2,
                failed: 1
            })
        );
        assert_eq!(
            fs::read_to_string(&fx.log_path).unwrap(),
            "https://clips.twitch.tv/Done\nhttps://clips.twitch.tv/Fine\n"
        );
        assert_eq!(out_files(&fx), 0);
        assert_eq!(
            *fx.fetcher_calls(),
            [
                "info https://clips.twitch.tv/Broken",
                "download https://clips.twitch.tv/Broken",
                "info https://clips.twitch.tv/Fine",
                "download https://clips.twitch.tv/Fine",
            ]
        );
    }

    #[test]
    fn downloader_failure_is_a_skip() {
        let mut fx = fixture("");
        fx.fetcher = ClipFetcher::new(FakeDownloader::default(), &fx.dir.path().join("out"));
        let posts = [post("Gone", "https://clips.twitch.tv/Gone")];
        let mut uploader = ScriptedUploader::new(&[]);

        let outcome = run(&posts, &mut fx.processed, &fx.fetcher, &mut uploader).unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(Counters {
                uploaded: 0,
                skipped: 1,
                failed: 0
            })
        );
        assert!(uploader.uploaded.is_empty());
    }

    impl Fixture {
        fn fetcher_calls(&self) -> std::cell::Ref<'_, Vec<String>> {
            self.fetcher.downloader().calls.borrow()
        }
    }
}
