use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced while building a fingerprint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// A fingerprint needs a skin type; the profile has none yet.
    #[error("profile {profile_id} has no skin type")]
    MissingSkinType { profile_id: Uuid },
}
