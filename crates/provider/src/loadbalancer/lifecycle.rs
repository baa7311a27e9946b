//! CRUD lifecycle driver for the load balancer resource.
//!
//! Each operation is a terminating call: it sequences codec, transport,
//! and convergence waits, then returns. No state persists between calls
//! beyond the remote side and whatever the host records. The host
//! serializes operations per resource instance; different instances may
//! run concurrently over the same shared client.

use std::time::Duration;

use apigw_client::{ApigwClient, Method};
use apigw_converge::{
    Error as ConvergeError, Observation, StateSource, StateWaiter, WaitConfig,
};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::codec::{self, UpdateBody};
use super::model::{LoadBalancer, LoadBalancerChanges, LoadBalancerSpec, Member};

const STATE_BUILD: &str = "BUILD";
const STATE_ACTIVE: &str = "ACTIVE";
const STATE_DOWN: &str = "DOWN";
const STATE_ERROR: &str = "ERROR";
const STATE_UPDATING: &str = "UPDATING";
const STATE_DELETING: &str = "DELETING";
const STATE_DELETED: &str = "DELETED";

/// Per-operation convergence deadlines.
#[derive(Debug, Clone)]
pub struct OperationTimeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        let fifteen_minutes = Duration::from_secs(15 * 60);
        Self {
            create: fifteen_minutes,
            update: fifteen_minutes,
            delete: fifteen_minutes,
        }
    }
}

impl OperationTimeouts {
    /// Deadlines shrunk for tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            create: Duration::from_secs(2),
            update: Duration::from_secs(2),
            delete: Duration::from_secs(2),
        }
    }
}

/// Lifecycle driver for load balancers on one platform.
#[derive(Debug, Clone)]
pub struct LoadBalancerLifecycle {
    client: ApigwClient,
    platform: String,
    timeouts: OperationTimeouts,
    poll_interval: Duration,
    stop_signal: Option<watch::Receiver<bool>>,
}

impl LoadBalancerLifecycle {
    /// Create a lifecycle driver over a shared client.
    pub fn new(client: ApigwClient, platform: impl Into<String>) -> Self {
        Self {
            client,
            platform: platform.into(),
            timeouts: OperationTimeouts::default(),
            poll_interval: Duration::from_secs(10),
            stop_signal: None,
        }
    }

    /// Set the per-operation deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: OperationTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the delay between convergence polls.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Thread a host-level shutdown signal through every convergence wait.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop_signal = Some(stop);
        self
    }

    /// The platform namespace this driver is scoped to.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub(crate) const fn client(&self) -> &ApigwClient {
        &self.client
    }

    pub(crate) fn collection_path(&self) -> String {
        format!("api/v4/{}/loadbalancers/", self.platform)
    }

    fn instance_path(&self, id: u64) -> String {
        format!("api/v4/{}/loadbalancers/{}/", self.platform, id)
    }

    /// Create the load balancer and wait for it to converge.
    ///
    /// Creation is two-phased: the base resource is POSTed and waited to a
    /// terminal build state; a declared member list is then applied as a
    /// follow-up partial update with its own wait. If the member phase
    /// fails the remote ID is already committed - the error carries it so
    /// the host can record the resource and resume with
    /// [`update`](Self::update).
    pub async fn create(&self, desired: &LoadBalancerSpec) -> Result<LoadBalancer> {
        info!(name = %desired.name, platform = %self.platform, "creating load balancer");

        let body = codec::encode_create(desired)?;
        let response = self
            .client
            .request(
                &self.platform,
                &self.collection_path(),
                Method::POST,
                Some(&body),
            )
            .await
            .map_err(|e| {
                Error::transport("create", desired.name.clone(), self.platform.clone(), e)
            })?;
        let created = codec::decode_loadbalancer(&response)?;
        let id = created.id;
        debug!(id, "remote committed load balancer id");

        self.wait_for_state(
            id,
            "create",
            WaitConfig::new([STATE_BUILD], [STATE_ACTIVE, STATE_DOWN])
                .with_error_states([STATE_ERROR])
                .with_timeout(self.timeouts.create),
            false,
        )
        .await?;

        if !desired.members.is_empty() {
            if let Err(e) = self.apply_members(id, &desired.members).await {
                return Err(Error::create_incomplete(id, self.platform.clone(), e));
            }
        }

        self.read(id).await
    }

    /// Read the current remote state.
    ///
    /// A 404 propagates as a not-found error; the host treats that as
    /// "resource no longer exists".
    pub async fn read(&self, id: u64) -> Result<LoadBalancer> {
        let response = self
            .client
            .request(&self.platform, &self.instance_path(id), Method::GET, None)
            .await
            .map_err(|e| Error::transport("read", id.to_string(), self.platform.clone(), e))?;
        codec::decode_loadbalancer(&response)
    }

    /// Apply a changeset and wait for it to converge, then re-read.
    ///
    /// An empty changeset (everything suppressed or unchanged) performs no
    /// network call and returns `None`.
    pub async fn update(
        &self,
        id: u64,
        changes: &LoadBalancerChanges,
    ) -> Result<Option<LoadBalancer>> {
        if changes.is_empty() {
            debug!(id, "changeset is empty, skipping update");
            return Ok(None);
        }

        info!(id, platform = %self.platform, "updating load balancer");
        let body = codec::encode_update(&UpdateBody::from_changes(changes))?;
        self.client
            .request(
                &self.platform,
                &self.instance_path(id),
                Method::PATCH,
                Some(&body),
            )
            .await
            .map_err(|e| Error::transport("update", id.to_string(), self.platform.clone(), e))?;

        self.wait_for_state(
            id,
            "update",
            WaitConfig::new([STATE_UPDATING], [STATE_ACTIVE])
                .with_error_states([STATE_ERROR])
                .with_timeout(self.timeouts.update),
            false,
        )
        .await?;

        self.read(id).await.map(Some)
    }

    /// Delete the load balancer and wait until the remote confirms.
    ///
    /// The deletion wait treats a 404 from the refresh as the synthetic
    /// `DELETED` state rather than a failure.
    pub async fn delete(&self, id: u64) -> Result<()> {
        info!(id, platform = %self.platform, "deleting load balancer");
        self.client
            .request(&self.platform, &self.instance_path(id), Method::DELETE, None)
            .await
            .map_err(|e| Error::transport("delete", id.to_string(), self.platform.clone(), e))?;

        self.wait_for_state(
            id,
            "delete",
            WaitConfig::new([STATE_DELETING], [STATE_DELETED])
                .with_error_states([STATE_ERROR])
                .with_timeout(self.timeouts.delete),
            true,
        )
        .await?;

        info!(id, "load balancer deleted");
        Ok(())
    }

    async fn apply_members(&self, id: u64, members: &[Member]) -> Result<()> {
        debug!(id, count = members.len(), "applying declared member list");
        let body = codec::encode_update(&UpdateBody::members_only(members))?;
        self.client
            .request(
                &self.platform,
                &self.instance_path(id),
                Method::PATCH,
                Some(&body),
            )
            .await
            .map_err(|e| {
                Error::transport("member update", id.to_string(), self.platform.clone(), e)
            })?;

        self.wait_for_state(
            id,
            "member update",
            WaitConfig::new([STATE_UPDATING], [STATE_ACTIVE])
                .with_error_states([STATE_ERROR])
                .with_timeout(self.timeouts.update),
            false,
        )
        .await?;

        Ok(())
    }

    async fn wait_for_state(
        &self,
        id: u64,
        op: &'static str,
        config: WaitConfig,
        deletion: bool,
    ) -> Result<Observation<Value>> {
        let mut source = RemoteStatusSource {
            client: &self.client,
            platform: &self.platform,
            path: self.instance_path(id),
            missing_is_deleted: deletion,
        };

        let config = config.with_interval(self.poll_interval);
        let waiter = match &self.stop_signal {
            Some(stop) => StateWaiter::new(config).with_stop_signal(stop.clone()),
            None => StateWaiter::new(config),
        };

        waiter
            .wait(&mut source)
            .await
            .map_err(|e| Error::converge(op, id.to_string(), self.platform.clone(), e))
    }
}

/// Refresh source that GETs the instance path and reports its status.
///
/// With `missing_is_deleted` set (the deletion variant), a 404 becomes the
/// synthetic `DELETED` state instead of propagating as a refresh failure.
struct RemoteStatusSource<'a> {
    client: &'a ApigwClient,
    platform: &'a str,
    path: String,
    missing_is_deleted: bool,
}

#[async_trait]
impl StateSource for RemoteStatusSource<'_> {
    type Item = Value;

    async fn observe(&mut self) -> apigw_converge::Result<Observation<Self::Item>> {
        match self
            .client
            .request(self.platform, &self.path, Method::GET, None)
            .await
        {
            Ok(body) => {
                let data: Value = serde_json::from_str(&body)
                    .map_err(|e| ConvergeError::refresh(format!("invalid refresh body: {e}")))?;
                let state = data
                    .get("status")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ConvergeError::refresh("refresh response missing status"))?
                    .to_string();
                Ok(Observation::new(Some(data), state))
            }
            Err(e) if self.missing_is_deleted && e.is_not_found() => {
                Ok(Observation::new(None, STATE_DELETED))
            }
            Err(e) => Err(ConvergeError::refresh(e.to_string())),
        }
    }
}
