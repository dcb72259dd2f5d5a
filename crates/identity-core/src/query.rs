//! Scope-driven credential query resolution.

use std::collections::HashSet;
use std::sync::Arc;

use database::Repository;
use thiserror::Error;

use crate::{
    model::{CredentialResource, CredentialState},
    scope::{scope_to_criterion, CredentialCriterion},
    status::CredentialStatusCheckService,
};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid scope: {0}")]
    InvalidScope(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("query failed: {0}")]
    Internal(String),
}

/// Resolves presentation queries against the credential store.
pub struct CredentialQueryResolver {
    store: Arc<dyn Repository<CredentialResource>>,
    status: CredentialStatusCheckService,
}

impl CredentialQueryResolver {
    pub fn new(
        store: Arc<dyn Repository<CredentialResource>>,
        status: CredentialStatusCheckService,
    ) -> Self {
        Self { store, status }
    }

    /// Resolves the credentials requested by `query_scopes`, enforcing that
    /// every result is covered by the scopes the access token granted.
    ///
    /// Credentials whose status check does not come back `Issued` are
    /// silently dropped from the result.
    pub async fn query(
        &self,
        participant_context_id: &str,
        query_scopes: &[String],
        granted_scopes: &[String],
    ) -> Result<Vec<CredentialResource>, QueryError> {
        if query_scopes.is_empty() {
            return Err(QueryError::InvalidScope(
                "query contains no scopes".to_string(),
            ));
        }

        let requested = parse_scopes(query_scopes)?;
        let granted = parse_scopes(granted_scopes)?;

        // Collect matches per criterion, deduplicated by credential id.
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for criterion in &requested {
            let mut filter = criterion.to_filter();
            filter.insert("participant_context_id", participant_context_id);

            let matches = self
                .store
                .find_all_by(filter, None)
                .await
                .map_err(|e| QueryError::Internal(e.to_string()))?;

            for resource in matches {
                if seen.insert(resource.credential_id.clone()) {
                    results.push(resource);
                }
            }
        }

        // Every matched credential must be covered by a granted scope.
        let uncovered = results.iter().find(|resource| {
            !granted
                .iter()
                .any(|criterion| criterion.matches(&resource.verifiable_credential.credential))
        });
        if let Some(resource) = uncovered {
            return Err(QueryError::Unauthorized(format!(
                "credential {} is not covered by the granted scopes",
                resource.credential_id
            )));
        }

        // Keep only credentials that are currently valid.
        let mut valid = Vec::new();
        for resource in results {
            match self.status.check(&resource).await {
                Ok(CredentialState::Issued) => valid.push(resource),
                Ok(state) => {
                    tracing::debug!(
                        credential_id = %resource.credential_id,
                        state = ?state,
                        "credential dropped from query result"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        credential_id = %resource.credential_id,
                        error = %err,
                        "status check failed, credential dropped from query result"
                    );
                }
            }
        }

        Ok(valid)
    }
}

fn parse_scopes(scopes: &[String]) -> Result<Vec<CredentialCriterion>, QueryError> {
    scopes
        .iter()
        .map(|scope| scope_to_criterion(scope).map_err(|e| QueryError::InvalidScope(e.to_string())))
        .collect()
}
