// src/services/identity.rs - Visitor identity resolution
use std::{fmt, sync::Arc};

use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::IdentityError;

type Result<T> = std::result::Result<T, IdentityError>;

/// Cookie and request attribute name carrying the visitor id
pub const AUID: &str = "auid";

/// Mints fresh visitor ids for requests that carry none
#[cfg_attr(test, mockall::automock)]
pub trait AnonymousIdGenerator: Send + Sync {
    /// Returns a new, collision-resistant anonymous visitor id
    ///
    /// ### Errors
    /// * `IdentityError::MissingCollaborator` - If the generator cannot mint an id
    fn generate_anonymous_user_id(&self) -> Result<String>;
}

/// The parts of a request/response pair the resolver reads and writes
pub trait VisitorExchange {
    /// Name of the authenticated principal, if any
    fn principal_name(&self) -> Option<String>;

    /// Value of the request cookie `name`; an absent cookie jar yields `None`
    fn cookie(&self, name: &str) -> Option<String>;

    /// Value of the request-scoped attribute `name`
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&mut self, name: &str, value: String);

    /// Appends a cookie to the outgoing response
    fn add_cookie(&mut self, name: &str, value: String);
}

/// Where a resolved visitor id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Principal,
    Cookie,
    Attribute,
    Generated,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Principal => "principal",
            Self::Cookie => "cookie",
            Self::Attribute => "attribute",
            Self::Generated => "generated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub visitor_id: String,
    pub source: IdentitySource,
}

impl ResolvedIdentity {
    fn new(visitor_id: String, source: IdentitySource) -> Self {
        Self { visitor_id, source }
    }
}

/// Finds or creates the visitor id of a request
///
/// Sources are tried in order: principal, `auid` cookie, `auid` request
/// attribute. Only when all miss is a new id generated; it is then written
/// back as a response cookie and a request attribute.
#[derive(Clone)]
pub struct IdentityResolver {
    generator: Arc<dyn AnonymousIdGenerator>,
}

impl IdentityResolver {
    pub fn new(generator: Arc<dyn AnonymousIdGenerator>) -> Self {
        Self { generator }
    }

    pub fn resolve<E>(&self, exchange: &mut E) -> Result<ResolvedIdentity>
    where
        E: VisitorExchange + ?Sized,
    {
        if let Some(name) = non_empty(exchange.principal_name()) {
            debug!("Visitor identified by principal '{}'", name);
            return Ok(ResolvedIdentity::new(name, IdentitySource::Principal));
        }

        if let Some(value) = non_empty(exchange.cookie(AUID)) {
            debug!("Visitor identified by cookie '{}'", value);
            return Ok(ResolvedIdentity::new(value, IdentitySource::Cookie));
        }

        if let Some(value) = non_empty(exchange.attribute(AUID)) {
            debug!("Visitor identified by request attribute '{}'", value);
            return Ok(ResolvedIdentity::new(value, IdentitySource::Attribute));
        }

        let visitor_id = self.generator.generate_anonymous_user_id().map_err(|e| {
            warn!("Anonymous id generation failed: {}", e);
            e
        })?;
        if visitor_id.is_empty() {
            warn!("Anonymous id generator returned an empty id");
            return Err(IdentityError::EmptyIdentity);
        }

        exchange.add_cookie(AUID, visitor_id.clone());
        exchange.set_attribute(AUID, visitor_id.clone());
        info!("Issued anonymous visitor id '{}'", visitor_id);

        Ok(ResolvedIdentity::new(visitor_id, IdentitySource::Generated))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
