//! Scope strings and their mapping to store criteria.
//!
//! Grammar: `<alias>:<value>:<operation>` with alias `vc.type` or `vc.id`
//! and operation `read`, `all` or `*`.

use did_core::vc::VerifiableCredential;
use mongodb::bson::{doc, Document as BsonDocument};
use thiserror::Error;

pub const SCOPE_ALIAS_TYPE: &str = "vc.type";
pub const SCOPE_ALIAS_ID: &str = "vc.id";

const SUPPORTED_OPERATIONS: &[&str] = &["read", "all", "*"];

/// A predicate over stored credentials, usable both as a MongoDB filter
/// and as an in-memory check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialCriterion {
    /// The credential's type set contains the value.
    TypeContains(String),
    /// The credential's id equals the value.
    IdEquals(String),
}

impl CredentialCriterion {
    /// Filter over the credential-resource collection.
    pub fn to_filter(&self) -> BsonDocument {
        match self {
            CredentialCriterion::TypeContains(cred_type) => {
                doc! {"verifiable_credential.credential.type": cred_type}
            }
            CredentialCriterion::IdEquals(id) => {
                doc! {"verifiable_credential.credential.id": id}
            }
        }
    }

    /// The same predicate applied to a parsed credential.
    pub fn matches(&self, credential: &VerifiableCredential) -> bool {
        match self {
            CredentialCriterion::TypeContains(cred_type) => {
                credential.cred_type.iter().any(|t| t == cred_type)
            }
            CredentialCriterion::IdEquals(id) => credential.id.as_deref() == Some(id),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("scope must have the form <alias>:<value>:<operation>: {0}")]
    InvalidFormat(String),
    #[error("unsupported scope alias: {0}")]
    UnsupportedAlias(String),
    #[error("unsupported scope operation: {0}")]
    UnsupportedOperation(String),
}

/// Parses a scope string into the criterion it grants.
pub fn scope_to_criterion(scope: &str) -> Result<CredentialCriterion, ScopeError> {
    let parts: Vec<&str> = scope.split(':').collect();
    let &[alias, value, operation] = parts.as_slice() else {
        return Err(ScopeError::InvalidFormat(scope.to_string()));
    };

    if value.is_empty() {
        return Err(ScopeError::InvalidFormat(scope.to_string()));
    }

    if !SUPPORTED_OPERATIONS.contains(&operation) {
        return Err(ScopeError::UnsupportedOperation(operation.to_string()));
    }

    match alias {
        SCOPE_ALIAS_TYPE => Ok(CredentialCriterion::TypeContains(value.to_string())),
        SCOPE_ALIAS_ID => Ok(CredentialCriterion::IdEquals(value.to_string())),
        other => Err(ScopeError::UnsupportedAlias(other.to_string())),
    }
}
