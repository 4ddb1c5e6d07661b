use std::path::PathBuf;

use clap::Parser;

/// Re-upload the top Twitch clips of a subreddit to a YouTube channel.
///
/// Every option can also be given through the environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The subreddit whose top posts are scanned for clips
    #[arg(long, env = "SUBREDDIT")]
    pub subreddit: String,

    /// The path to a JSON array of `{"ip", "port"}` HTTP proxies used to reach the subreddit
    #[arg(long, env = "PROXIES_FILE")]
    pub proxies_file: PathBuf,

    /// The ID of the YouTube channel to upload to
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: String,

    /// The path to the saved YouTube session cookies.
    /// If it does not exist, you will be asked to log in by hand and it will be created
    #[arg(long, env = "YOUTUBE_COOKIES_FILE", default_value = "youtube_cookies.json")]
    pub cookies_file: PathBuf,

    /// The path to the log of uploaded clip URLs, avoiding uploading multiple times the same clip
    #[arg(long, env = "PROCESSED_LOG", default_value = "data.txt")]
    pub processed_log: PathBuf,

    /// The directory where clips are downloaded before being uploaded
    #[arg(long, env = "OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// The URL of the WebDriver server controlling the browser (e.g. `chromedriver`)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Run the browser without a window. Not usable for the first login
    #[arg(long, env = "HEADLESS")]
    pub headless: bool,

    /// The file the logs are appended to
    #[arg(long, env = "LOG_FILE", default_value = "logs.log")]
    pub log_file: PathBuf,

    /// Print debug logs
    #[arg(short, long, env = "VERBOSE")]
    pub verbose: bool,
}
