//! Attribute structs for the load balancer resource.
//!
//! Desired state ([`LoadBalancerSpec`]) comes from the host; observed state
//! ([`LoadBalancer`]) comes back from the remote through the codec. Fields
//! the remote computes (status, counters, vip, ...) are only ever read.

use std::collections::BTreeMap;

use super::members::members_equivalent;

/// Default member port when the declaration omits one.
pub const DEFAULT_MEMBER_PORT: u16 = 80;

/// Default member weight when the declaration omits one.
pub const DEFAULT_MEMBER_WEIGHT: u32 = 1;

/// A backend member. Keyed by `(ip, port)`; `status` is remote-computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub ip: String,
    pub port: u16,
    pub weight: u32,
    /// Remote-computed operational status; ignored when diffing.
    pub status: Option<String>,
}

impl Member {
    /// Create a member on the default port with the default weight.
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: DEFAULT_MEMBER_PORT,
            weight: DEFAULT_MEMBER_WEIGHT,
            status: None,
        }
    }

    /// Set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the weight.
    #[must_use]
    pub const fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Health monitor block. Fully replaced on any change, never partially
/// patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Monitor {
    pub delay: i64,
    pub expected_codes: String,
    pub http_method: String,
    pub max_retries: i64,
    pub monitor_type: String,
    pub timeout: i64,
    pub url_path: String,
}

impl Monitor {
    /// Create a monitor of the given type.
    pub fn new(monitor_type: impl Into<String>) -> Self {
        Self {
            monitor_type: monitor_type.into(),
            ..Default::default()
        }
    }

    /// Set the probe delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: i64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the expected HTTP status codes.
    #[must_use]
    pub fn with_expected_codes(mut self, codes: impl Into<String>) -> Self {
        self.expected_codes = codes.into();
        self
    }

    /// Set the probe HTTP method.
    #[must_use]
    pub fn with_http_method(mut self, method: impl Into<String>) -> Self {
        self.http_method = method.into();
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the probe timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: i64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the probe URL path.
    #[must_use]
    pub fn with_url_path(mut self, path: impl Into<String>) -> Self {
        self.url_path = path.into();
        self
    }
}

/// Declared (desired) state of a load balancer.
///
/// `name`, `desc`, `protocol`, `protocol_port`, and `private_net` are
/// immutable after creation; changing them means replacement, which the
/// host drives as delete-then-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub desc: String,
    pub lb_method: String,
    pub protocol: String,
    pub protocol_port: u16,
    pub private_net: String,
    pub monitor: Option<Monitor>,
    pub members: Vec<Member>,
}

impl LoadBalancerSpec {
    /// Create a spec from the required fields.
    pub fn new(
        name: impl Into<String>,
        lb_method: impl Into<String>,
        protocol: impl Into<String>,
        protocol_port: u16,
        private_net: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            desc: String::new(),
            lb_method: lb_method.into(),
            protocol: protocol.into(),
            protocol_port,
            private_net: private_net.into(),
            monitor: None,
            members: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Attach a health monitor.
    #[must_use]
    pub fn with_monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Append a backend member.
    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Replace the member list.
    #[must_use]
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }
}

/// Observed state of a load balancer as decoded from the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancer {
    /// Opaque remote-assigned identifier, immutable after creation.
    pub id: u64,
    pub name: String,
    pub desc: String,
    pub lb_method: String,
    pub protocol: String,
    pub protocol_port: u16,
    pub private_net: String,
    pub members: Vec<Member>,
    pub monitor: Option<Monitor>,
    pub status: String,
    pub status_reason: String,
    pub vip: String,
    pub active_connections: i64,
    pub total_connections: i64,
    pub create_time: String,
    pub user: Option<BTreeMap<String, String>>,
    pub waf: Option<BTreeMap<String, String>>,
}

/// Changeset for a load balancer update, limited to the mutable fields.
///
/// [`between`](Self::between) applies member-list diff suppression: a
/// reordered but set-equal member list produces no member entry, and an
/// empty changeset produces no network call at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancerChanges {
    pub lb_method: Option<String>,
    pub members: Option<Vec<Member>>,
}

impl LoadBalancerChanges {
    /// Compute the changeset between observed and desired state.
    pub fn between(prior: &LoadBalancer, desired: &LoadBalancerSpec) -> Self {
        let lb_method =
            (prior.lb_method != desired.lb_method).then(|| desired.lb_method.clone());
        let members = (!members_equivalent(&prior.members, &desired.members))
            .then(|| desired.members.clone());

        Self { lb_method, members }
    }

    /// Changeset that only updates the balancing method.
    pub fn lb_method(method: impl Into<String>) -> Self {
        Self {
            lb_method: Some(method.into()),
            ..Default::default()
        }
    }

    /// Changeset that only replaces the member list.
    pub fn members(members: Vec<Member>) -> Self {
        Self {
            members: Some(members),
            ..Default::default()
        }
    }

    /// Whether the changeset carries nothing to send.
    pub const fn is_empty(&self) -> bool {
        self.lb_method.is_none() && self.members.is_none()
    }
}
