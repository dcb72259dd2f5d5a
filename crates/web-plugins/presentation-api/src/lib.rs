//! DCP presentation API.
//!
//! Exposes `POST /api/presentation/v1/participants/:participant_id/presentation/query`,
//! authenticated with a self-issued ID token, answering with a
//! `PresentationResponseMessage`.

mod error;
mod model;
pub mod plugin;
mod web;

pub use model::{PresentationQueryMessage, PresentationResponseMessage};
