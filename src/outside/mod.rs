mod command;
mod twitch_dl;

pub use twitch_dl::{ClipDownloader, TwitchDl};
