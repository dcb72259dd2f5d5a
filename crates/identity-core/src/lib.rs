/*! # identity-core

Core services of the identity hub. Participants, their key pairs and their
stored credentials live in MongoDB collections behind `database::Repository`;
private key material goes through the `keystore` crate. On top of those sit
the DCP-facing services: scope-driven credential query resolution, status-list
checking, verifiable presentation generation and self-issued token
verification.
*/

pub mod errors;
pub mod events;
pub mod jwt;
pub mod keypairs;
pub mod model;
pub mod participants;
pub mod presentation;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod scope;
pub mod state;
pub mod status;
pub mod token;
pub mod verification;

/// Milliseconds since the Unix epoch, the timestamp unit of all entities.
pub(crate) fn now_unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
