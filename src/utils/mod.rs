pub mod codec;
pub mod id_generator;

pub use id_generator::{RandomIdGenerator, SequenceIdGenerator};
