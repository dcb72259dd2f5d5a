use crate::{
    crypto::{Ed25519KeyPair, ToMultikey},
    document::{Context, Document, MethodRef, VerificationMethod},
    jwk::Jwk,
    methods::errors::DidMethodError,
};

const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
const JWS_2020_CONTEXT: &str = "https://w3id.org/security/suites/jws-2020/v1";

/// The did:key method for Ed25519 keys.
///
/// See <https://w3c-ccg.github.io/did-method-key/>
pub struct DidKeyMethod;

impl DidKeyMethod {
    /// Derives a did:key DID from the key pair's public half.
    pub fn generate(keypair: &Ed25519KeyPair) -> String {
        format!("did:key:{}", keypair.to_multikey())
    }

    /// Expands a did:key DID into its DID document.
    ///
    /// The document carries a single verification method (`<did>#<multikey>`)
    /// referenced by the authentication and assertion relationships.
    pub fn resolve(did: &str) -> Result<Document, DidMethodError> {
        let multikey = did
            .strip_prefix("did:key:")
            .ok_or_else(|| DidMethodError::MethodNotSupported(did.to_string()))?;

        let keypair = Ed25519KeyPair::from_multikey(multikey)
            .map_err(|_| DidMethodError::InvalidDid(did.to_string()))?;

        let method_id = format!("{did}#{multikey}");
        let jwk = Jwk::from(&keypair);

        Ok(Document {
            context: Context::SetOfString(vec![
                DID_CONTEXT.to_string(),
                JWS_2020_CONTEXT.to_string(),
            ]),
            id: did.to_string(),
            controller: None,
            also_known_as: None,
            verification_method: Some(vec![VerificationMethod {
                id: method_id.clone(),
                key_type: "JsonWebKey2020".to_string(),
                controller: did.to_string(),
                public_key_jwk: Some(jwk),
                public_key_multibase: None,
                public_key_base58: None,
                additional_properties: None,
            }]),
            authentication: Some(vec![MethodRef::Reference(method_id.clone())]),
            assertion_method: Some(vec![MethodRef::Reference(method_id)]),
            capability_delegation: None,
            capability_invocation: None,
            key_agreement: None,
            service: None,
            additional_properties: None,
            proof: None,
        })
    }
}
