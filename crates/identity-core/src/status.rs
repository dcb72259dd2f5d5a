//! Credential status checking against published status lists.
//!
//! Supports `BitstringStatusListEntry` and `StatusList2021Entry` references:
//! the referenced list credential is fetched, its `encodedList` decoded
//! (base64url over a GZIP-compressed bitstring, optionally multibase
//! prefixed) and the bit at the entry's index inspected.

use std::io::Read;

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use did_core::vc::{CredentialStatus, VerifiableCredential};
use flate2::read::GzDecoder;
use thiserror::Error;

use crate::model::{CredentialResource, CredentialState};

const PURPOSE_REVOCATION: &str = "revocation";
const PURPOSE_SUSPENSION: &str = "suspension";

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("could not fetch status list: {0}")]
    Fetch(String),
    #[error("malformed status list: {0}")]
    Malformed(String),
    #[error("status purpose mismatch: entry wants {entry}, list serves {list}")]
    PurposeMismatch { entry: String, list: String },
    #[error("status list index {0} out of bounds")]
    IndexOutOfBounds(usize),
}

/// Determines the effective state of stored credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialStatusCheckService {
    client: reqwest::Client,
}

impl CredentialStatusCheckService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the current state of a credential resource.
    ///
    /// Status list entries take precedence over temporal validity; a
    /// revocation outranks a suspension.
    pub async fn check(
        &self,
        resource: &CredentialResource,
    ) -> Result<CredentialState, StatusError> {
        let credential = &resource.verifiable_credential.credential;

        let mut suspended = false;
        if let Some(statuses) = &credential.credential_status {
            for entry in statuses.iter() {
                match self.check_entry(entry).await? {
                    Some(CredentialState::Revoked) => return Ok(CredentialState::Revoked),
                    Some(CredentialState::Suspended) => suspended = true,
                    _ => {}
                }
            }
        }
        if suspended {
            return Ok(CredentialState::Suspended);
        }

        Ok(temporal_state(credential))
    }

    async fn check_entry(
        &self,
        entry: &CredentialStatus,
    ) -> Result<Option<CredentialState>, StatusError> {
        let url = entry
            .status_list_credential
            .as_ref()
            .ok_or_else(|| Self::missing(entry, "statusListCredential"))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StatusError::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StatusError::Fetch(format!(
                "status list server answered {}",
                response.status()
            )));
        }

        let list_credential: VerifiableCredential = response
            .json()
            .await
            .map_err(|e| StatusError::Malformed(e.to_string()))?;

        evaluate_entry(entry, &list_credential)
    }

    fn missing(entry: &CredentialStatus, member: &str) -> StatusError {
        StatusError::Malformed(format!(
            "status entry {} lacks {member}",
            entry.id.as_deref().unwrap_or("<unnamed>")
        ))
    }
}

/// Evaluates a status entry against its (already fetched) status list.
pub(crate) fn evaluate_entry(
    entry: &CredentialStatus,
    list_credential: &VerifiableCredential,
) -> Result<Option<CredentialState>, StatusError> {
    let entry_purpose = entry
        .status_purpose
        .as_deref()
        .unwrap_or(PURPOSE_REVOCATION);

    let subject = list_credential
        .credential_subject
        .iter()
        .next()
        .ok_or_else(|| StatusError::Malformed("status list has no subject".to_string()))?;

    let properties = subject
        .additional_properties
        .as_ref()
        .ok_or_else(|| StatusError::Malformed("status list subject is empty".to_string()))?;

    let list_purpose = properties
        .get("statusPurpose")
        .and_then(|v| v.as_str())
        .unwrap_or(PURPOSE_REVOCATION);
    if list_purpose != entry_purpose {
        return Err(StatusError::PurposeMismatch {
            entry: entry_purpose.to_string(),
            list: list_purpose.to_string(),
        });
    }

    let encoded_list = properties
        .get("encodedList")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StatusError::Malformed("status list lacks encodedList".to_string()))?;

    let index: usize = entry
        .status_list_index
        .as_deref()
        .ok_or_else(|| StatusError::Malformed("status entry lacks statusListIndex".to_string()))?
        .parse()
        .map_err(|_| StatusError::Malformed("unparseable statusListIndex".to_string()))?;

    let bitstring = decode_status_list(encoded_list)?;
    let bit = bit_at(&bitstring, index).ok_or(StatusError::IndexOutOfBounds(index))?;

    if !bit {
        return Ok(None);
    }

    match entry_purpose {
        PURPOSE_SUSPENSION => Ok(Some(CredentialState::Suspended)),
        _ => Ok(Some(CredentialState::Revoked)),
    }
}

/// Decodes a base64url (optionally multibase-`u`-prefixed) GZIP bitstring.
pub(crate) fn decode_status_list(encoded: &str) -> Result<Vec<u8>, StatusError> {
    let encoded = encoded.strip_prefix('u').unwrap_or(encoded);
    let encoded = encoded.trim_end_matches('=');

    let compressed = Base64UrlUnpadded::decode_vec(encoded)
        .map_err(|_| StatusError::Malformed("undecodable encodedList".to_string()))?;

    let mut bitstring = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut bitstring)
        .map_err(|e| StatusError::Malformed(format!("bad gzip payload: {e}")))?;

    Ok(bitstring)
}

/// Reads bit `index` of a most-significant-bit-first bitstring.
pub(crate) fn bit_at(bitstring: &[u8], index: usize) -> Option<bool> {
    let byte = bitstring.get(index / 8)?;
    Some((byte >> (7 - index % 8)) & 1 == 1)
}

fn temporal_state(credential: &VerifiableCredential) -> CredentialState {
    let now = Utc::now();

    if let Some(valid_until) = credential.valid_until {
        if valid_until < now {
            return CredentialState::Expired;
        }
    }
    if let Some(valid_from) = credential.valid_from {
        if valid_from > now {
            return CredentialState::NotYetValid;
        }
    }

    CredentialState::Issued
}
