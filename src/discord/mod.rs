pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod session;

pub use client::DiscordClient;
pub use models::{Channel, CurrentUser, Message};
pub use session::Session;

/// Discord refuses message content longer than this many characters.
pub const MAX_CONTENT_CHARS: usize = 2000;
