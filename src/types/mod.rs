mod clip;
mod post;
mod proxy;

pub use clip::{Clip, ClipMetadata};
pub use post::{Listing, Post};
pub use proxy::Proxy;
