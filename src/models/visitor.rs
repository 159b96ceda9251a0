// src/models/visitor.rs - Request-scoped visitor data
use std::collections::HashMap;

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Serialize;

use crate::{
    errors::{AppError, IdentityError},
    services::{IdentitySource, ResolvedIdentity},
};

/// Authenticated principal, placed in request extensions by an authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Named string attributes shared by every stage of a single request
#[derive(Debug, Clone, Default)]
pub struct RequestAttributes(HashMap<String, String>);

impl RequestAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

/// Extractor for the visitor id resolved by the identity middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorId {
    pub visitor_id: String,
    pub source: IdentitySource,
}

impl From<ResolvedIdentity> for VisitorId {
    fn from(identity: ResolvedIdentity) -> Self {
        Self {
            visitor_id: identity.visitor_id,
            source: identity.source,
        }
    }
}

impl FromRequest for VisitorId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = req
            .extensions()
            .get::<ResolvedIdentity>()
            .cloned()
            .map(VisitorId::from)
            .ok_or(AppError::Identity(IdentityError::NotResolved));
        ready(resolved)
    }
}
