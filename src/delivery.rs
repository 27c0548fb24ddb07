//! Sequenced delivery of both digest bodies over one session.
//!
//! The success body always goes first. Each destination is independent: an
//! unconfigured or missing channel, or a rejected send, is logged and
//! recorded, then the next destination is attempted. Nothing is retried and the session is left open
//! for the caller to close once.

use tracing::{error, info, warn};

use crate::config::Destinations;
use crate::discord::Session;
use crate::error::{DiscordError, Error};
use crate::report::{Digest, Outcome};

/// Order in which destinations are served.
pub const DELIVERY_ORDER: [Outcome; 2] = [Outcome::Succeeded, Outcome::Failed];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent { message_id: String },
    /// Nothing accumulated for this destination.
    Skipped,
    NotFound,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub outcome: Outcome,
    /// `None` when no id is configured for this destination.
    pub channel_id: Option<String>,
    pub status: DeliveryStatus,
}

impl Delivery {
    #[must_use]
    pub const fn is_problem(&self) -> bool {
        matches!(
            self.status,
            DeliveryStatus::NotFound | DeliveryStatus::Failed { .. }
        )
    }
}

/// Bodies that would be sent, in delivery order, with their channel ids.
#[must_use]
pub fn planned<'a>(
    digest: &'a Digest,
    destinations: &'a Destinations,
) -> Vec<(Outcome, Option<&'a str>, &'a str)> {
    DELIVERY_ORDER
        .into_iter()
        .map(|outcome| {
            let channel_id = destinations.channel_for(outcome).ok();
            (outcome, channel_id, digest.body(outcome))
        })
        .filter(|(_, _, body)| !body.is_empty())
        .collect()
}

/// Attempt both destinations in order and report what happened to each.
pub async fn deliver_all(
    session: &Session,
    digest: &Digest,
    destinations: &Destinations,
) -> Vec<Delivery> {
    let mut deliveries = Vec::with_capacity(DELIVERY_ORDER.len());
    for outcome in DELIVERY_ORDER {
        let body = digest.body(outcome);
        let channel_id = destinations.channel_for(outcome);
        let status = match (body.is_empty(), &channel_id) {
            (true, _) => DeliveryStatus::Skipped,
            (false, Ok(channel_id)) => deliver_one(session, outcome, channel_id, body).await,
            (false, Err(err)) => {
                error!(%outcome, error = %err, "no channel configured for destination");
                DeliveryStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };
        deliveries.push(Delivery {
            outcome,
            channel_id: channel_id.ok().map(str::to_string),
            status,
        });
    }
    deliveries
}

async fn deliver_one(
    session: &Session,
    outcome: Outcome,
    channel_id: &str,
    body: &str,
) -> DeliveryStatus {
    let channel = match session.resolve_channel(channel_id).await {
        Ok(channel) => channel,
        Err(Error::Discord(DiscordError::ChannelNotFound { .. })) => {
            error!(%outcome, channel_id, "Channel not found!");
            return DeliveryStatus::NotFound;
        }
        Err(err) => {
            error!(%outcome, channel_id, error = %err, "failed to resolve channel");
            return DeliveryStatus::Failed {
                reason: err.to_string(),
            };
        }
    };

    match session.send_message(&channel, body).await {
        Ok(message) => {
            info!(
                %outcome,
                channel_id,
                channel = channel.name.as_deref().unwrap_or("<unnamed>"),
                message_id = %message.id,
                "Message sent!"
            );
            DeliveryStatus::Sent {
                message_id: message.id,
            }
        }
        Err(err) => {
            warn!(%outcome, channel_id, error = %err, "failed to send message");
            DeliveryStatus::Failed {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Delivery, DeliveryStatus, planned};
    use crate::config::Destinations;
    use crate::report::{Digest, Outcome};

    fn destinations() -> Destinations {
        Destinations {
            success: Some("100".into()),
            failure: Some("200".into()),
        }
    }

    #[test]
    fn plan_lists_success_before_failure() {
        let digest = Digest {
            success: "ok".into(),
            failure: "bad".into(),
        };
        let dest = destinations();
        let plan = planned(&digest, &dest);
        assert_eq!(
            plan,
            vec![
                (Outcome::Succeeded, Some("100"), "ok"),
                (Outcome::Failed, Some("200"), "bad")
            ]
        );
    }

    #[test]
    fn plan_skips_empty_bodies() {
        let digest = Digest {
            success: String::new(),
            failure: "bad".into(),
        };
        let dest = destinations();
        assert_eq!(
            planned(&digest, &dest),
            vec![(Outcome::Failed, Some("200"), "bad")]
        );
    }

    #[test]
    fn plan_works_without_configured_channels() {
        let digest = Digest {
            success: "ok".into(),
            failure: String::new(),
        };
        let dest = Destinations::default();
        let plan = planned(&digest, &dest);
        assert_eq!(plan, vec![(Outcome::Succeeded, None, "ok")]);
    }

    #[test]
    fn only_not_found_and_failed_are_problems() {
        let delivery = |status| Delivery {
            outcome: Outcome::Failed,
            channel_id: Some("200".into()),
            status,
        };
        assert!(!delivery(DeliveryStatus::Skipped).is_problem());
        assert!(!delivery(DeliveryStatus::Sent { message_id: "1".into() }).is_problem());
        assert!(delivery(DeliveryStatus::NotFound).is_problem());
        assert!(delivery(DeliveryStatus::Failed { reason: "boom".into() }).is_problem());
    }
}
