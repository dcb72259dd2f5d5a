use std::sync::Arc;

use axum::Router;
use identity_core::state::HubState;
use plugin_api::{Plugin, PluginError};

use crate::web;

/// Mounts the management API.
#[derive(Default)]
pub struct IdentityApi {
    state: Option<Arc<HubState>>,
}

impl Plugin for IdentityApi {
    fn name(&self) -> &'static str {
        "identity_api"
    }

    fn mount(&mut self) -> Result<(), PluginError> {
        if std::env::var("SUPER_USER_API_KEY").is_err() {
            tracing::warn!("SUPER_USER_API_KEY not set, participant creation is disabled");
        }

        self.state = Some(Arc::new(HubState::from_env()));
        Ok(())
    }

    fn unmount(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn routes(&self) -> Result<Router, PluginError> {
        let state = self.state.as_ref().ok_or(PluginError::Other(
            "missing state, plugin not mounted".to_owned(),
        ))?;
        Ok(web::routes(state.clone()))
    }
}
