mod codec;
mod visitor;

pub use codec::{decode_handler, encode_handler};
pub use visitor::visitor_handler;
