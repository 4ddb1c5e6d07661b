use std::{
    thread,
    time::{Duration, Instant},
};

use miette::{miette, Context, IntoDiagnostic};
use tracing::{debug, error, info};

use crate::{
    result::{Error, Result},
    types::{Listing, Post, Proxy},
};

/// Total time given to the proxies to answer
pub const TIME_BUDGET: Duration = Duration::from_secs(60);

/// Pause between two attempts
pub const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Time given to a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A response of the listing endpoint
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Interface for issuing a GET request through a proxy
pub trait ListingClient {
    fn get(&self, url: &str, proxy: &Proxy) -> miette::Result<Response>;
}

/// [ListingClient] backed by a blocking `reqwest` client
#[derive(Debug, Default)]
pub struct HttpClient;

impl ListingClient for HttpClient {
    fn get(&self, url: &str, proxy: &Proxy) -> miette::Result<Response> {
        // The proxy is a client setting, so one client per attempt
        let client = reqwest::blocking::Client::builder()
            .proxy(reqwest::Proxy::all(proxy.url()).into_diagnostic()?)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .into_diagnostic()
            .wrap_err("Could not build HTTP client")?;

        let resp = client.get(url).send().into_diagnostic()?;
        let status = resp.status().as_u16();
        let body = resp.text().into_diagnostic()?;
        Ok(Response { status, body })
    }
}

/// Source of the subreddit top posts
pub struct PostSource<C> {
    client: C,
    proxies: Vec<Proxy>,
    budget: Duration,
    pause: Duration,
}

impl<C: ListingClient> PostSource<C> {
    pub fn new(client: C, proxies: Vec<Proxy>) -> Self {
        Self {
            client,
            proxies,
            budget: TIME_BUDGET,
            pause: RETRY_PAUSE,
        }
    }

    #[cfg(test)]
    pub fn with_timing(mut self, budget: Duration, pause: Duration) -> Self {
        self.budget = budget;
        self.pause = pause;
        self
    }

    /// Fetch the top posts of the subreddit.
    ///
    /// Try random proxies until one answers with a success status,
    /// or fail with [Error::Timeout] once the time budget has elapsed.
    pub fn fetch(&self, subreddit: &str) -> Result<Vec<Post>> {
        if self.proxies.is_empty() {
            return Err(miette!("The proxy list is empty").into());
        }

        let url = listing_url(subreddit);
        let start = Instant::now();

        loop {
            if start.elapsed() > self.budget {
                error!("Timed out...");
                return Err(Error::Timeout(self.budget));
            }

            let proxy = &self.proxies[fastrand::usize(..self.proxies.len())];

            match self.client.get(&url, proxy) {
                Ok(resp) if resp.status == 200 => {
                    info!("Using proxy: {proxy}");
                    let listing: Listing = serde_json::from_str(&resp.body)
                        .into_diagnostic()
                        .wrap_err("Could not parse the listing")?;
                    return Ok(listing.into_posts());
                }
                Ok(resp) => debug!("Proxy {proxy} answered {}. Trying the next one", resp.status),
                Err(err) => debug!("Proxy {proxy} failed: {err}. Trying the next one"),
            }

            thread::sleep(self.pause);
        }
    }
}

fn listing_url(subreddit: &str) -> String {
    format!("https://old.reddit.com/r/{subreddit}/top/.json")
}
