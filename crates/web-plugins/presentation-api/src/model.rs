//! DCP message shapes, processed in compacted JSON-LD form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Context IRI of the presentation-exchange vocabulary.
pub const PRESENTATION_EXCHANGE_CONTEXT: &str =
    "https://identity.foundation/presentation-exchange/submission/v1";

/// Context IRI of the DCP vocabulary.
pub const DCP_CONTEXT: &str = "https://w3id.org/tractusx-trust/v0.8";

pub const PRESENTATION_QUERY_TYPE: &str = "PresentationQueryMessage";
pub const PRESENTATION_RESPONSE_TYPE: &str = "PresentationResponseMessage";

/// An incoming presentation query.
#[derive(Debug, Deserialize, Clone)]
pub struct PresentationQueryMessage {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "@type", alias = "type")]
    pub message_type: String,

    #[serde(default)]
    pub scope: Vec<String>,

    #[serde(rename = "presentationDefinition")]
    pub presentation_definition: Option<Value>,
}

impl PresentationQueryMessage {
    /// Structural validation, before any authentication happens.
    ///
    /// A query must carry the DCP context, announce the right type and use
    /// exactly one of `scope` / `presentationDefinition`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.context.iter().any(|c| c == DCP_CONTEXT) {
            return Err(format!("@context must include {DCP_CONTEXT}"));
        }
        if self.message_type != PRESENTATION_QUERY_TYPE {
            return Err(format!("@type must be {PRESENTATION_QUERY_TYPE}"));
        }

        let has_scope = !self.scope.is_empty();
        let has_definition = self.presentation_definition.is_some();
        match (has_scope, has_definition) {
            (true, true) => {
                Err("scope and presentationDefinition are mutually exclusive".to_string())
            }
            (false, false) => {
                Err("one of scope or presentationDefinition is required".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// The successful answer to a presentation query.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PresentationResponseMessage {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "type")]
    pub message_type: String,

    pub presentation: Vec<Value>,
}

impl PresentationResponseMessage {
    pub fn new(presentation: Vec<Value>) -> Self {
        Self {
            context: vec![
                PRESENTATION_EXCHANGE_CONTEXT.to_string(),
                DCP_CONTEXT.to_string(),
            ],
            message_type: PRESENTATION_RESPONSE_TYPE.to_string(),
            presentation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(body: Value) -> PresentationQueryMessage {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_scope_query_validates() {
        let message = message(json!({
            "@context": [PRESENTATION_EXCHANGE_CONTEXT, DCP_CONTEXT],
            "@type": "PresentationQueryMessage",
            "scope": ["vc.type:MembershipCredential:read"]
        }));
        assert!(message.validate().is_ok());
    }

    #[test]
    fn test_scopeless_query_is_invalid() {
        let message = message(json!({
            "@context": [PRESENTATION_EXCHANGE_CONTEXT, DCP_CONTEXT],
            "@type": "PresentationQueryMessage"
        }));
        assert!(message.validate().is_err());
    }

    #[test]
    fn test_scope_and_definition_are_exclusive() {
        let message = message(json!({
            "@context": [DCP_CONTEXT],
            "@type": "PresentationQueryMessage",
            "scope": ["vc.type:X:read"],
            "presentationDefinition": {}
        }));
        assert!(message.validate().is_err());
    }

    #[test]
    fn test_unknown_context_or_type_is_invalid() {
        let unknown_context = message(json!({
            "@context": ["https://example.com/other/v1"],
            "@type": "PresentationQueryMessage",
            "scope": ["vc.type:X:read"]
        }));
        assert!(unknown_context.validate().is_err());

        let unknown_type = message(json!({
            "@context": [DCP_CONTEXT],
            "@type": "SomethingElse",
            "scope": ["vc.type:X:read"]
        }));
        assert!(unknown_type.validate().is_err());
    }

    #[test]
    fn test_response_carries_both_contexts() {
        let response = PresentationResponseMessage::new(vec![json!("jwt")]);
        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(serialized["@context"].as_array().unwrap().len(), 2);
        assert_eq!(serialized["type"], PRESENTATION_RESPONSE_TYPE);
    }
}
