use std::sync::Arc;

use axum::Router;
use identity_core::state::HubState;
use plugin_api::{Plugin, PluginError};

use crate::web;

/// Mounts the DCP presentation endpoint.
#[derive(Default)]
pub struct PresentationApi {
    state: Option<Arc<HubState>>,
}

impl Plugin for PresentationApi {
    fn name(&self) -> &'static str {
        "presentation_api"
    }

    fn mount(&mut self) -> Result<(), PluginError> {
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
