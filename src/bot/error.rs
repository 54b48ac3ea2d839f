use thiserror::Error;

use crate::constants::messages;
use crate::db::models::ChannelRole;
use crate::db::store::StoreError;
use crate::services::transport::DeliveryError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("{0} channel is not configured")]
    NotConfigured(ChannelRole),

    #[error("Channel not found: {0}")]
    ChannelUnavailable(u64),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    /// Lift a transport failure that happened while talking to `channel_id`.
    pub fn delivery(channel_id: u64, err: DeliveryError) -> Self {
        match err {
            DeliveryError::NotFound => Error::ChannelUnavailable(channel_id),
            DeliveryError::Forbidden => Error::PermissionDenied(format!("channel {}", channel_id)),
            DeliveryError::Transport(msg) => Error::Transport(msg),
        }
    }

    /// The single notice shown to a user when a foreground action fails.
    pub fn user_message(&self) -> String {
        match self {
            Error::NotConfigured(role) => messages::not_configured(*role),
            Error::ChannelUnavailable(_) => messages::CHANNEL_NOT_FOUND.to_string(),
            Error::PermissionDenied(_) => messages::PERMISSION_DENIED.to_string(),
            Error::InvalidArgument(msg) | Error::Custom(msg) => msg.clone(),
            Error::Store(_) | Error::Serenity(_) | Error::Transport(_) => {
                messages::GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_errors_map_to_taxonomy() {
        assert!(matches!(
            Error::delivery(7, DeliveryError::NotFound),
            Error::ChannelUnavailable(7)
        ));
        assert!(matches!(
            Error::delivery(7, DeliveryError::Forbidden),
            Error::PermissionDenied(_)
        ));
        assert!(matches!(
            Error::delivery(7, DeliveryError::Transport("reset".into())),
            Error::Transport(_)
        ));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::ChannelUnavailable(1).user_message(),
            messages::CHANNEL_NOT_FOUND
        );
        assert_eq!(
            Error::Transport("timeout".into()).user_message(),
            messages::GENERIC_FAILURE
        );
        assert_eq!(
            Error::NotConfigured(ChannelRole::Sub).user_message(),
            messages::not_configured(ChannelRole::Sub)
        );
        assert_eq!(
            Error::InvalidArgument("nope".into()).user_message(),
            "nope"
        );
    }
}
