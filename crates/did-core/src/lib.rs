/*! # did-core

Reusable building blocks for DID-based identity:

- **Documents**: the W3C DID core document model with tri-format key material.
- **Keys**: compact JSON Web Keys and Ed25519 key pairs behind curve-agnostic traits.
- **Proofs**: the `eddsa-jcs-2022` Data Integrity cryptosuite.
- **Credentials**: verifiable credential and presentation models, including status entries.
- **Methods**: did:key generation/resolution and did:web resolution.
*/

pub mod crypto;
pub mod document;
pub mod jwk;
pub mod methods;
pub mod proof;
pub mod vc;
