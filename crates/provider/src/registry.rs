//! Thin glue binding resource kinds to their lifecycle drivers.

use apigw_client::{ApigwClient, ProviderConfig};
use tracing::info;

use crate::error::Result;
use crate::loadbalancer::lifecycle::LoadBalancerLifecycle;
use crate::schema::{loadbalancer_schema, ResourceSchema};

/// The load balancer resource kind.
pub const RESOURCE_LOADBALANCER: &str = "loadbalancer";

/// A configured provider holding the shared control-plane client.
///
/// The client is read-only after configuration; lifecycle drivers handed
/// out by this type may be used concurrently across resource instances.
#[derive(Debug, Clone)]
pub struct Provider {
    client: ApigwClient,
}

impl Provider {
    /// Validate the configuration and build the shared client.
    pub fn configure(config: ProviderConfig) -> Result<Self> {
        let client = ApigwClient::new(config)?;
        info!("provider configured");
        Ok(Self { client })
    }

    /// Lifecycle driver for load balancers on the given platform.
    pub fn loadbalancers(&self, platform: impl Into<String>) -> LoadBalancerLifecycle {
        LoadBalancerLifecycle::new(self.client.clone(), platform)
    }

    /// Resource kinds this provider serves.
    pub const fn resource_kinds() -> &'static [&'static str] {
        &[RESOURCE_LOADBALANCER]
    }

    /// Schema declaration for a resource kind.
    pub fn schema(kind: &str) -> Option<ResourceSchema> {
        match kind {
            RESOURCE_LOADBALANCER => Some(loadbalancer_schema()),
            _ => None,
        }
    }

    /// The shared transport client.
    pub const fn client(&self) -> &ApigwClient {
        &self.client
    }
}
