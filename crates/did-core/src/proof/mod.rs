//! Data Integrity proofs.

mod eddsa_jcs_2022;
mod model;
mod traits;

pub use eddsa_jcs_2022::{EdDsaJcs2022, CRYPTOSUITE_EDDSA_JCS_2022, PROOF_TYPE_DATA_INTEGRITY};
pub use model::{Domain, Proof, Proofs, UnsecuredDocument};
pub use traits::CryptoProof;
