//! Management API.
//!
//! Administers participants, their key pairs and their stored credentials
//! under `/api/identity/v1`. Requests authenticate with the `x-api-key`
//! header: either the participant's own API token or the superuser token.

mod error;
pub mod plugin;
mod web;
