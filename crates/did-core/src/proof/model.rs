use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Data Integrity proof.
///
/// See <https://www.w3.org/TR/vc-data-integrity/#proofs>
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub proof_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,

    pub proof_purpose: String,

    pub verification_method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    // Absent while the proof options are being prepared for signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_proof: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Domain {
    SingleString(String),
    SetOfString(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Proofs {
    SingleProof(Box<Proof>),
    SetOfProofs(Vec<Proof>),
}

/// A document together with the proof(s) securing it.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
pub struct UnsecuredDocument {
    #[serde(flatten)]
    pub content: Value,

    pub proof: Proofs,
}
