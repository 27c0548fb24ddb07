use tokio::time::timeout;
use tracing::{debug, info};

use crate::Result;
use crate::error::DiscordError;

use super::client::DiscordClient;
use super::models::{Channel, CreateMessage, CurrentUser, Message};
use super::MAX_CONTENT_CHARS;

/// A Discord session whose identity has been confirmed.
///
/// Exactly one session exists per run. It is released when dropped; callers
/// are expected to end it with [`Session::close`] once every send was
/// attempted.
pub struct Session {
    client: DiscordClient,
    user: CurrentUser,
    closed: bool,
}

impl DiscordClient {
    /// Open the session and wait until it is ready.
    ///
    /// Ready means the backend accepted the token and returned the bot user.
    /// The wait is bounded by the configured ready timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::Unauthorized`] for a rejected token,
    /// [`DiscordError::ReadyTimeout`] when the backend does not answer in
    /// time, or the transport error otherwise.
    pub async fn connect(self) -> Result<Session> {
        let waited = self.ready_timeout;
        let user: CurrentUser = match timeout(waited, self.get(&["users", "@me"])).await {
            Ok(res) => res?,
            Err(_) => return Err(DiscordError::ReadyTimeout { waited }.into()),
        };
        info!(user_id = %user.id, bot = user.bot, "Ready! Logged in as {}", user.tag());
        Ok(Session {
            client: self,
            user,
            closed: false,
        })
    }
}

impl Session {
    pub const fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Look up a destination channel by id.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::ChannelNotFound`] when Discord answers 404, or
    /// the underlying API/transport error.
    pub async fn resolve_channel(&self, channel_id: &str) -> Result<Channel> {
        match self.client.get(&["channels", channel_id]).await {
            Ok(channel) => Ok(channel),
            Err(
                DiscordError::Api { status, .. } | DiscordError::HttpStatus { status },
            ) if status == reqwest::StatusCode::NOT_FOUND => Err(DiscordError::ChannelNotFound {
                channel_id: channel_id.to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Post `content` as a single message.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::ContentTooLong`] without contacting Discord
    /// when the text exceeds [`MAX_CONTENT_CHARS`], or the API/transport error.
    pub async fn send_message(&self, channel: &Channel, content: &str) -> Result<Message> {
        let chars = content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(DiscordError::ContentTooLong {
                chars,
                limit: MAX_CONTENT_CHARS,
            }
            .into());
        }
        let message: Message = self
            .client
            .post(&["channels", channel.id.as_str(), "messages"], &CreateMessage::silent(content))
            .await?;
        Ok(message)
    }

    /// End the session. Consumes it so nothing can be sent afterwards.
    pub fn close(mut self) {
        self.closed = true;
        info!(user = %self.user.tag(), "session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            debug!(user = %self.user.tag(), "session released without explicit close");
        }
    }
}
