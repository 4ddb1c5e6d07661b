mod already_processed;
mod browser;
mod cli;
mod fetcher;
mod filter;
mod logging;
mod outside;
mod pipeline;
mod reddit;
mod result;
mod skip;
mod types;

use std::io;

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use tracing::{info, Level};

use crate::{
    already_processed::AlreadyProcessed,
    browser::{Pacing, UploadSession, WebDriverPage},
    cli::Args,
    fetcher::ClipFetcher,
    outside::TwitchDl,
    pipeline::RunOutcome,
    reddit::{HttpClient, PostSource},
    types::Proxy,
};

fn main() -> Result<()> {
    // Initialize the environment & CLI
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logging::init_logging(level, &args.log_file)?;

    // Make sure the needed directories are created
    std::fs::create_dir_all(&args.out_dir)
        .into_diagnostic()
        .wrap_err("Could not create out directory")?;

    let downloader = TwitchDl::new()?;
    let mut processed = AlreadyProcessed::read_or_create(&args.processed_log)
        .wrap_err("Could not create or read processed log")?;
    info!("{} clips already processed", processed.len());

    info!("Get the r/{} top posts", args.subreddit);
    let proxies = Proxy::read_list(&args.proxies_file)?;
    let posts = PostSource::new(HttpClient, proxies)
        .fetch(&args.subreddit)
        .map_err(miette::Report::from)
        .wrap_err("Could not get the subreddit posts")?;
    info!("{} posts in the listing", posts.len());

    let page = WebDriverPage::connect(&args.webdriver_url, args.headless)?;
    let mut session = UploadSession::open(
        page,
        &args.channel_id,
        &args.cookies_file,
        Pacing::default(),
        io::stdin().lock(),
    )
    .wrap_err("Could not log in")?;

    let fetcher = ClipFetcher::new(downloader, &args.out_dir);
    let outcome = pipeline::run(&posts, &mut processed, &fetcher, &mut session)?;
    session.close()?;

    match outcome {
        RunOutcome::Completed(_) => info!("All posts processed"),
        RunOutcome::QuotaExhausted(counters) => {
            info!("Stopped early, {} clips uploaded", counters.uploaded)
        }
    }
    Ok(())
}
