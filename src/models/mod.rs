mod token;
mod visitor;

pub use token::TokenDto;
pub use visitor::{Principal, RequestAttributes, VisitorId};
