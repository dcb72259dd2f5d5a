use crate::{document::Document, methods::errors::DidMethodError};

/// Resolver for the did:web method.
///
/// See <https://w3c-ccg.github.io/did-method-web/>
#[derive(Debug, Clone, Default)]
pub struct DidWebResolver {
    client: reqwest::Client,
}

impl DidWebResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a did:web DID by fetching its `did.json` over HTTPS.
    pub async fn resolve(&self, did: &str) -> Result<Document, DidMethodError> {
        let url = Self::to_url(did)?;

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DidMethodError::NonSuccessResponse(
                response.status().as_u16(),
            ));
        }

        response
            .json::<Document>()
            .await
            .map_err(|err| DidMethodError::UnparseableDocument(err.to_string()))
    }

    /// Maps a did:web DID to the URL its document is served from.
    ///
    /// `did:web:example.com` → `https://example.com/.well-known/did.json`,
    /// further colon-separated segments become path segments, and `%3A`
    /// decodes to a port separator.
    fn to_url(did: &str) -> Result<String, DidMethodError> {
        let identifier = did
            .strip_prefix("did:web:")
            .ok_or_else(|| DidMethodError::MethodNotSupported(did.to_string()))?;

        let mut segments = identifier.split(':');
        let authority = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DidMethodError::InvalidDid(did.to_string()))?
            .replace("%3A", ":");

        let path: Vec<&str> = segments.collect();
        let url = if path.is_empty() {
            format!("https://{authority}/.well-known/did.json")
        } else {
            format!("https://{authority}/{}/did.json", path.join("/"))
        };

        Ok(url)
    }
}
