mod credentials;
mod keypairs;
mod participants;

use std::sync::Arc;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use identity_core::state::HubState;
use subtle::ConstantTimeEq;

use crate::error::IdentityApiError;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

pub(crate) fn routes(state: Arc<HubState>) -> Router {
    Router::new()
        .route("/api/identity/v1/participants", post(participants::create))
        .route(
            "/api/identity/v1/participants/:participant_id",
            get(participants::get).delete(participants::delete),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/state",
            post(participants::set_state),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/token",
            post(participants::regenerate_token),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/keypairs",
            get(keypairs::list).post(keypairs::add),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/keypairs/activate",
            post(keypairs::activate),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/keypairs/rotate",
            post(keypairs::rotate),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/keypairs/revoke",
            post(keypairs::revoke),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/credentials",
            get(credentials::list).put(credentials::upsert),
        )
        .route(
            "/api/identity/v1/participants/:participant_id/credentials/:credential_id",
            get(credentials::get).delete(credentials::delete),
        )
        .with_state(state)
}

fn presented_key(headers: &HeaderMap) -> Result<&str, IdentityApiError> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(IdentityApiError::Unauthorized)
}

fn is_superuser(presented: &str) -> bool {
    match std::env::var("SUPER_USER_API_KEY") {
        Ok(superuser) if !superuser.is_empty() => {
            presented.as_bytes().ct_eq(superuser.as_bytes()).into()
        }
        _ => false,
    }
}

/// Requires the superuser token.
pub(crate) fn authorize_superuser(headers: &HeaderMap) -> Result<(), IdentityApiError> {
    if is_superuser(presented_key(headers)?) {
        Ok(())
    } else {
        Err(IdentityApiError::Unauthorized)
    }
}

/// Requires the participant's own API token (or the superuser token).
pub(crate) async fn authorize(
    state: &HubState,
    headers: &HeaderMap,
    participant_id: &str,
) -> Result<(), IdentityApiError> {
    let presented = presented_key(headers)?;

    if is_superuser(presented) {
        return Ok(());
    }

    let stored = state
        .participants
        .stored_api_token(participant_id)
        .await
        .map_err(|_| IdentityApiError::Unauthorized)?
        .ok_or(IdentityApiError::Unauthorized)?;

    if presented.as_bytes().ct_eq(stored.as_bytes()).into() {
        Ok(())
    } else {
        Err(IdentityApiError::Unauthorized)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
    use did_core::jwk::Jwk;
    use http_body_util::BodyExt;
    use identity_core::{
        model::{CreatedParticipantContext, ParticipantManifest},
        repository::tests::MockRepository,
    };
    use keystore::Keystore;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    pub(crate) const SUPERUSER_KEY: &str = "super-user-test-key";

    pub(crate) struct TestHub {
        pub(crate) app: Router,
    }

    pub(crate) fn setup() -> TestHub {
        std::env::set_var("SUPER_USER_API_KEY", SUPERUSER_KEY);

        let secrets: Vec<(String, Jwk)> = vec![];
        let state = Arc::new(HubState::build(
            Arc::new(MockRepository::new(vec![])),
            Arc::new(MockRepository::new(vec![])),
            Arc::new(MockRepository::new(vec![])),
            Keystore::with_mock_configs(secrets),
        ));

        TestHub {
            app: routes(state),
        }
    }

    pub(crate) async fn request(
        app: Router,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub(crate) async fn create_participant(hub: &TestHub, id: &str) -> CreatedParticipantContext {
        let manifest = ParticipantManifest {
            participant_context_id: id.to_string(),
            did: None,
            active: true,
            roles: vec![],
            key: None,
        };

        let (status, body) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants",
            Some(SUPERUSER_KEY),
            Some(serde_json::to_value(&manifest).unwrap()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        serde_json::from_value(body).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_participant_auth_accepts_own_token_only() {
        let hub = setup();
        let created = create_participant(&hub, "acme").await;
        let _other = create_participant(&hub, "globex").await;

        // Own token works.
        let (status, body) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["participant_context_id"], "acme");

        // A different participant's token does not.
        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/globex",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // No key at all does not either.
        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // The superuser reaches everything.
        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(SUPERUSER_KEY),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_requires_superuser() {
        let hub = setup();

        let manifest = json!({"participant_context_id": "acme", "active": true});
        let (status, _) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants",
            Some("not-the-superuser"),
            Some(manifest),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
