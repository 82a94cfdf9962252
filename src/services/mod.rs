pub mod gateway;
pub mod llm_provider;
pub mod mock_gateway;
pub mod remote_content;
pub mod speech;

use std::sync::Arc;

use crate::config::GatewayConfig;
use gateway::ContentGateway;

/// Pick the gateway implementation for the configured mode.
pub fn build_gateway(config: &GatewayConfig) -> Arc<dyn ContentGateway> {
    if config.enabled && config.mock {
        tracing::info!("Content gateway running in mock mode");
        Arc::new(mock_gateway::MockContentGateway)
    } else {
        if !config.enabled {
            tracing::warn!("Content gateway disabled; remote calls will fail");
        }
        Arc::new(remote_content::RemoteContentGateway::new(config))
    }
}
