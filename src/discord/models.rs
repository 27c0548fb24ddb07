use serde::{Deserialize, Serialize};

const BODY_PREVIEW_LIMIT: usize = 256;

/// The bot account behind the session token.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl CurrentUser {
    /// `name#1234` for legacy accounts, plain `name` once discriminators are gone.
    #[must_use]
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(disc) if !disc.is_empty() && disc != "0" => format!("{}#{disc}", self.username),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateMessage<'a> {
    pub(crate) content: &'a str,
    pub(crate) allowed_mentions: AllowedMentions,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct AllowedMentions {
    pub(crate) parse: Vec<&'static str>,
}

impl<'a> CreateMessage<'a> {
    /// Plain text message that cannot ping users, roles or `@everyone`.
    pub(crate) fn silent(content: &'a str) -> Self {
        Self {
            content,
            allowed_mentions: AllowedMentions::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub(crate) code: i64,
    pub(crate) message: String,
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
