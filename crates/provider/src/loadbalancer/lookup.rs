//! Load balancer lookup through the list endpoint.

use apigw_client::Method;
use tracing::debug;

use crate::error::{Error, Result};

use super::codec;
use super::lifecycle::LoadBalancerLifecycle;
use super::model::LoadBalancer;

/// Filter for finding an existing load balancer by name.
///
/// The list endpoint requires at least one of `project` / `private_net`
/// alongside the name.
#[derive(Debug, Clone, Default)]
pub struct LookupFilter {
    pub name: String,
    pub project: Option<String>,
    pub private_net: Option<String>,
}

impl LookupFilter {
    /// Filter by name; add a project or private network before use.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Scope the lookup to a project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Scope the lookup to a private network.
    #[must_use]
    pub fn with_private_net(mut self, private_net: impl Into<String>) -> Self {
        self.private_net = Some(private_net.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_filter("name must be specified"));
        }

        if self.project.is_none() && self.private_net.is_none() {
            return Err(Error::invalid_filter(
                "either project or private_net must be specified",
            ));
        }

        Ok(())
    }

    fn query(&self) -> String {
        let mut params = vec![format!("name={}", self.name)];
        if let Some(project) = &self.project {
            params.push(format!("project={project}"));
        }
        if let Some(private_net) = &self.private_net {
            params.push(format!("private_net={private_net}"));
        }
        params.join("&")
    }
}

impl LoadBalancerLifecycle {
    /// Find an existing load balancer matching the filter.
    ///
    /// Lists the collection with the filter's query parameters and selects
    /// the entry whose name matches exactly.
    pub async fn lookup(&self, filter: &LookupFilter) -> Result<LoadBalancer> {
        filter.validate()?;

        let path = format!("{}?{}", self.collection_path(), filter.query());
        let response = self
            .client()
            .request(self.platform(), &path, Method::GET, None)
            .await
            .map_err(|e| {
                Error::transport("lookup", filter.name.clone(), self.platform().to_string(), e)
            })?;

        let candidates = codec::decode_loadbalancer_list(&response)?;
        debug!(name = %filter.name, candidates = candidates.len(), "lookup returned candidates");

        candidates
            .into_iter()
            .find(|lb| lb.name == filter.name)
            .ok_or_else(|| Error::lookup_miss(filter.name.clone(), self.platform().to_string()))
    }
}
