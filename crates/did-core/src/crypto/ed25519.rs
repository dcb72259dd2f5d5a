use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use multibase::Base;

use super::{
    errors::Error,
    traits::{CoreSign, Generate, KeyMaterial, ToMultikey, BYTES_LENGTH_32},
};
use crate::jwk::Jwk;

/// Multicodec prefix of a raw Ed25519 public key.
const ED25519_MULTICODEC_PREFIX: [u8; 2] = [0xed, 0x01];

/// An Ed25519 key pair.
///
/// The signing half is optional: a verification-only instance is built from
/// public key bytes and can never sign.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    pub public_key: VerifyingKey,
    pub secret_key: Option<SigningKey>,
}

impl Generate for Ed25519KeyPair {
    fn new() -> Result<Self, Error> {
        let mut seed = [0u8; BYTES_LENGTH_32];
        getrandom::getrandom(&mut seed).map_err(|_| Error::InvalidCall("rng failure".to_string()))?;
        Self::from_secret_key(&seed)
    }

    fn new_with_seed(seed: &[u8]) -> Result<Self, Error> {
        let seed: [u8; BYTES_LENGTH_32] = seed
            .try_into()
            .map_err(|_| Error::InvalidSeed(BYTES_LENGTH_32))?;
        Self::from_secret_key(&seed)
    }

    fn from_public_key(public_key: &[u8; BYTES_LENGTH_32]) -> Result<Self, Error> {
        Ok(Self {
            public_key: VerifyingKey::from_bytes(public_key).map_err(|_| Error::InvalidPublicKey)?,
            secret_key: None,
        })
    }

    fn from_secret_key(private_key: &[u8; BYTES_LENGTH_32]) -> Result<Self, Error> {
        let signing_key = SigningKey::from_bytes(private_key);
        Ok(Self {
            public_key: signing_key.verifying_key(),
            secret_key: Some(signing_key),
        })
    }
}

impl KeyMaterial for Ed25519KeyPair {
    fn public_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        Ok(self.public_key.to_bytes())
    }

    fn private_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        self.secret_key
            .as_ref()
            .map(|sk| sk.to_bytes())
            .ok_or(Error::MissingSecretKey)
    }
}

impl CoreSign for Ed25519KeyPair {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let signing_key = self.secret_key.as_ref().ok_or(Error::MissingSecretKey)?;
        Ok(signing_key.sign(payload).to_bytes().to_vec())
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
        let signature = Signature::from_slice(signature).map_err(|_| Error::VerificationError)?;
        self.public_key
            .verify(payload, &signature)
            .map_err(|_| Error::VerificationError)
    }
}

impl ToMultikey for Ed25519KeyPair {
    fn to_multikey(&self) -> String {
        let mut prefixed = ED25519_MULTICODEC_PREFIX.to_vec();
        prefixed.extend_from_slice(&self.public_key.to_bytes());
        multibase::encode(Base::Base58Btc, prefixed)
    }
}

impl Ed25519KeyPair {
    /// Rebuilds a key pair from a multibase multikey string.
    pub fn from_multikey(multikey: &str) -> Result<Self, Error> {
        let (_, decoded) = multibase::decode(multikey).map_err(|_| Error::InvalidPublicKey)?;

        let raw = decoded
            .strip_prefix(&ED25519_MULTICODEC_PREFIX[..])
            .ok_or(Error::InvalidPublicKey)?;
        let raw: [u8; BYTES_LENGTH_32] = raw.try_into().map_err(|_| Error::InvalidKeyLength)?;

        Self::from_public_key(&raw)
    }
}

impl TryFrom<&Jwk> for Ed25519KeyPair {
    type Error = Error;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        if jwk.key_type != "OKP" || jwk.curve != "Ed25519" {
            return Err(Error::InvalidCall(format!(
                "unsupported key type {}/{}",
                jwk.key_type, jwk.curve
            )));
        }

        if let Some(d) = &jwk.d {
            return Self::from_secret_key(&decode_key_member(d)?);
        }

        let x = jwk.x.as_ref().ok_or(Error::InvalidPublicKey)?;
        Self::from_public_key(&decode_key_member(x)?)
    }
}

impl From<&Ed25519KeyPair> for Jwk {
    fn from(keypair: &Ed25519KeyPair) -> Self {
        Jwk {
            key_id: None,
            key_type: "OKP".to_string(),
            curve: "Ed25519".to_string(),
            x: Some(Base64UrlUnpadded::encode_string(
                &keypair.public_key.to_bytes(),
            )),
            y: None,
            d: keypair
                .secret_key
                .as_ref()
                .map(|sk| Base64UrlUnpadded::encode_string(&sk.to_bytes())),
            alg: Some("EdDSA".to_string()),
        }
    }
}

fn decode_key_member(encoded: &str) -> Result<[u8; BYTES_LENGTH_32], Error> {
    let bytes = Base64UrlUnpadded::decode_vec(encoded).map_err(|_| Error::InvalidKeyLength)?;
    bytes.try_into().map_err(|_| Error::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let keypair = Ed25519KeyPair::new_with_seed(b"Seed phrase of exactly 32 bytes!").unwrap();
        let payload = b"identity hub payload";

        let signature = keypair.sign(payload).unwrap();

        let verifier =
            Ed25519KeyPair::from_public_key(&keypair.public_key_bytes().unwrap()).unwrap();
        assert!(verifier.verify(payload, &signature).is_ok());
        assert_eq!(
            verifier.verify(b"tampered payload", &signature),
            Err(Error::VerificationError)
        );
        assert_eq!(verifier.sign(payload), Err(Error::MissingSecretKey));
    }

    #[test]
    fn test_jwk_roundtrip() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let jwk = Jwk::from(&keypair);
        assert!(jwk.is_private());

        let restored = Ed25519KeyPair::try_from(&jwk).unwrap();
        assert_eq!(
            restored.public_key_bytes().unwrap(),
            keypair.public_key_bytes().unwrap()
        );

        let public_only = Ed25519KeyPair::try_from(&jwk.to_public()).unwrap();
        assert!(public_only.secret_key.is_none());
    }

    #[test]
    fn test_multikey_roundtrip() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let multikey = keypair.to_multikey();

        // Base58btc multibase with the ed25519 multicodec prefix.
        assert!(multikey.starts_with("z6Mk"));

        let restored = Ed25519KeyPair::from_multikey(&multikey).unwrap();
        assert_eq!(
            restored.public_key_bytes().unwrap(),
            keypair.public_key_bytes().unwrap()
        );
    }

    #[test]
    fn test_rejects_foreign_curves() {
        let jwk = Jwk {
            key_type: "EC".to_string(),
            curve: "P-256".to_string(),
            ..Default::default()
        };
        assert!(Ed25519KeyPair::try_from(&jwk).is_err());
    }
}
