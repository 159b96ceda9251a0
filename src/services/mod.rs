use std::sync::Arc;

use log::info;

mod identity;

pub use identity::{
    AnonymousIdGenerator, IdentityResolver, IdentitySource, ResolvedIdentity, VisitorExchange,
    AUID,
};

#[cfg(test)]
pub use identity::MockAnonymousIdGenerator;

use crate::{
    config::{GeneratorKind, IdentityConfig},
    utils::{RandomIdGenerator, SequenceIdGenerator},
};

/// Builds the identity resolver with the generator selected by configuration
pub fn identity_resolver(config: &IdentityConfig) -> IdentityResolver {
    let generator: Arc<dyn AnonymousIdGenerator> = match config.generator {
        GeneratorKind::Random => Arc::new(RandomIdGenerator::new(config.id_prefix.clone())),
        GeneratorKind::Sequence => Arc::new(SequenceIdGenerator::new(
            config.id_prefix.clone(),
            config.sequence_start,
        )),
    };
    info!("Anonymous visitor ids use the {:?} generator", config.generator);

    IdentityResolver::new(generator)
}
