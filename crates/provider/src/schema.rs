//! Host-facing attribute schema metadata.
//!
//! The host's diff engine consumes this declaration: which attributes
//! exist, their types, whether a change is applied in place or forces
//! replacement, and schema defaults. Member-list equality for diff
//! suppression is provided separately by
//! [`members_equivalent`](crate::loadbalancer::members::members_equivalent).

/// Attribute value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Int,
    List,
    Map,
}

/// Who owns an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrBehavior {
    /// Must be declared by the host.
    Required,
    /// May be declared by the host.
    Optional,
    /// Only ever written by the remote.
    Computed,
    /// Declarable, but filled in by the remote when absent.
    OptionalComputed,
}

/// One attribute declaration.
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    pub name: &'static str,
    pub kind: AttrKind,
    pub behavior: AttrBehavior,
    /// A change to this attribute forces replacement (delete + create),
    /// driven by the host rather than the lifecycle.
    pub force_new: bool,
    /// Schema default applied when the declaration omits the attribute.
    pub default: Option<i64>,
    /// Element schema for list attributes.
    pub elem: Option<&'static [AttrSpec]>,
}

impl AttrSpec {
    const fn new(name: &'static str, kind: AttrKind, behavior: AttrBehavior) -> Self {
        Self {
            name,
            kind,
            behavior,
            force_new: false,
            default: None,
            elem: None,
        }
    }

    /// Declare a required attribute.
    pub const fn required(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, AttrBehavior::Required)
    }

    /// Declare an optional attribute.
    pub const fn optional(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, AttrBehavior::Optional)
    }

    /// Declare a remote-computed attribute.
    pub const fn computed(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, AttrBehavior::Computed)
    }

    /// Declare an optional attribute the remote fills in when absent.
    pub const fn optional_computed(name: &'static str, kind: AttrKind) -> Self {
        Self::new(name, kind, AttrBehavior::OptionalComputed)
    }

    /// Mark a change to this attribute as forcing replacement.
    #[must_use]
    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Set the schema default.
    #[must_use]
    pub const fn with_default(mut self, value: i64) -> Self {
        self.default = Some(value);
        self
    }

    /// Attach an element schema for a list attribute.
    #[must_use]
    pub const fn with_elem(mut self, elem: &'static [AttrSpec]) -> Self {
        self.elem = Some(elem);
        self
    }
}

/// Schema for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSchema {
    pub kind: &'static str,
    pub attributes: &'static [AttrSpec],
}

impl ResourceSchema {
    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&'static AttrSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes whose change forces replacement.
    pub fn force_new_attrs(&self) -> impl Iterator<Item = &'static AttrSpec> {
        self.attributes.iter().filter(|a| a.force_new)
    }
}

const MEMBER_ELEM: &[AttrSpec] = &[
    AttrSpec::optional("ip", AttrKind::String),
    AttrSpec::optional("port", AttrKind::Int).with_default(80),
    AttrSpec::computed("status", AttrKind::String),
    AttrSpec::optional("weight", AttrKind::Int).with_default(1),
];

const MONITOR_ELEM: &[AttrSpec] = &[
    AttrSpec::optional_computed("delay", AttrKind::Int),
    AttrSpec::optional_computed("expected_codes", AttrKind::String),
    AttrSpec::optional_computed("http_method", AttrKind::String),
    AttrSpec::optional_computed("max_retries", AttrKind::Int),
    AttrSpec::optional_computed("monitor_type", AttrKind::String),
    AttrSpec::optional_computed("timeout", AttrKind::Int),
    AttrSpec::optional_computed("url_path", AttrKind::String),
];

const LOADBALANCER_ATTRS: &[AttrSpec] = &[
    AttrSpec::computed("active_connections", AttrKind::Int),
    AttrSpec::computed("create_time", AttrKind::String).force_new(),
    AttrSpec::optional("desc", AttrKind::String).force_new(),
    AttrSpec::required("lb_method", AttrKind::String),
    AttrSpec::optional("members", AttrKind::List).with_elem(MEMBER_ELEM),
    AttrSpec::optional_computed("monitor", AttrKind::List).with_elem(MONITOR_ELEM),
    AttrSpec::required("name", AttrKind::String).force_new(),
    AttrSpec::required("platform", AttrKind::String).force_new(),
    AttrSpec::required("private_net", AttrKind::String).force_new(),
    AttrSpec::required("protocol", AttrKind::String).force_new(),
    AttrSpec::required("protocol_port", AttrKind::Int).force_new(),
    AttrSpec::computed("status", AttrKind::String),
    AttrSpec::computed("status_reason", AttrKind::String),
    AttrSpec::computed("total_connections", AttrKind::Int),
    AttrSpec::computed("user", AttrKind::Map).force_new(),
    AttrSpec::computed("vip", AttrKind::String),
    AttrSpec::computed("waf", AttrKind::Map),
];

/// Schema declaration for the load balancer kind.
pub const fn loadbalancer_schema() -> ResourceSchema {
    ResourceSchema {
        kind: "loadbalancer",
        attributes: LOADBALANCER_ATTRS,
    }
}
