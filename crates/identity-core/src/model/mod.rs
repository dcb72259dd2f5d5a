//! Persistent entities of the identity hub.

mod credential;
mod keypair;
mod participant;

pub use credential::{
    CredentialFormat, CredentialResource, CredentialState, VerifiableCredentialContainer,
};
pub use keypair::{KeyDescriptor, KeyPairResource, KeyPairState};
pub use participant::{
    CreatedParticipantContext, ParticipantContext, ParticipantContextState, ParticipantManifest,
};
