use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};
use rand::{rng, Rng};

use super::codec;
use crate::{errors::IdentityError, services::AnonymousIdGenerator};

/// Mints anonymous visitor ids from random 63-bit values shortened with the codec
#[derive(Debug, Default, Clone)]
pub struct RandomIdGenerator {
    prefix: String,
}

impl RandomIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl AnonymousIdGenerator for RandomIdGenerator {
    fn generate_anonymous_user_id(&self) -> Result<String, IdentityError> {
        let value: i64 = rng().random_range(0..=i64::MAX);
        let token = codec::encode(value)
            .map_err(|e| IdentityError::MissingCollaborator(e.to_string()))?;
        Ok(format!("{}{}", self.prefix, token))
    }
}

/// Mints anonymous visitor ids from a monotonically increasing counter
///
/// The counter lives in memory only, so `start` should be moved past every
/// id handed out by a previous process.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceIdGenerator {
    pub fn new(prefix: impl Into<String>, start: u64) -> Self {
        debug!("Anonymous id sequence starts at {}", start);
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(start),
        }
    }
}

impl AnonymousIdGenerator for SequenceIdGenerator {
    fn generate_anonymous_user_id(&self) -> Result<String, IdentityError> {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        let id = i64::try_from(value).map_err(|_| {
            warn!("Anonymous id sequence exhausted at {}", value);
            IdentityError::MissingCollaborator("anonymous id sequence exhausted".to_string())
        })?;
        let token = codec::encode(id)
            .map_err(|e| IdentityError::MissingCollaborator(e.to_string()))?;
        Ok(format!("{}{}", self.prefix, token))
    }
}
