mod request_id;
mod visitor_identity;

pub use request_id::{request_id, X_REQUEST_ID};
pub use visitor_identity::{IdentityCookie, VisitorIdentity};
