use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The anonymous id generator failed or could not be reached
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    /// The anonymous id generator answered with an empty id
    #[error("Missing collaborator: anonymous id generator returned an empty id")]
    EmptyIdentity,

    /// A handler asked for the visitor before the identity middleware ran
    #[error("Internal error: visitor identity was not resolved for this request")]
    NotResolved,
}
