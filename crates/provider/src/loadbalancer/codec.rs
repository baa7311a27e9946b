//! Wire codec for the load balancer resource.
//!
//! The mapping between attribute structs and wire JSON is explicit: encode
//! emits exactly the fields the wire schema declares (zero-valued optional
//! fields are omitted entirely, per the remote's PATCH semantics), and
//! decode drops unknown remote fields, defaults missing optional ones, and
//! coerces the remote's floating-point numerics to integers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::model::{
    LoadBalancer, LoadBalancerChanges, LoadBalancerSpec, Member, Monitor, DEFAULT_MEMBER_PORT,
    DEFAULT_MEMBER_WEIGHT,
};

/// Create request body. Monitor fields ride flat on the create call and
/// are omitted when unset.
#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    #[serde(skip_serializing_if = "int_is_zero")]
    delay: i64,
    #[serde(skip_serializing_if = "str_is_empty")]
    desc: &'a str,
    #[serde(skip_serializing_if = "str_is_empty")]
    expected_codes: &'a str,
    #[serde(skip_serializing_if = "str_is_empty")]
    http_method: &'a str,
    lb_method: &'a str,
    #[serde(skip_serializing_if = "int_is_zero")]
    max_retries: i64,
    #[serde(skip_serializing_if = "str_is_empty")]
    monitor_type: &'a str,
    name: &'a str,
    private_net: &'a str,
    protocol: &'a str,
    protocol_port: u16,
    #[serde(skip_serializing_if = "int_is_zero")]
    timeout: i64,
    #[serde(skip_serializing_if = "str_is_empty")]
    url_path: &'a str,
}

impl<'a> CreateBody<'a> {
    pub(crate) fn from_spec(spec: &'a LoadBalancerSpec) -> Self {
        let monitor = spec.monitor.as_ref();
        Self {
            delay: monitor.map_or(0, |m| m.delay),
            desc: &spec.desc,
            expected_codes: monitor.map_or("", |m| m.expected_codes.as_str()),
            http_method: monitor.map_or("", |m| m.http_method.as_str()),
            lb_method: &spec.lb_method,
            max_retries: monitor.map_or(0, |m| m.max_retries),
            monitor_type: monitor.map_or("", |m| m.monitor_type.as_str()),
            name: &spec.name,
            private_net: &spec.private_net,
            protocol: &spec.protocol,
            protocol_port: spec.protocol_port,
            timeout: monitor.map_or(0, |m| m.timeout),
            url_path: monitor.map_or("", |m| m.url_path.as_str()),
        }
    }
}

/// Partial-update request body. Only fields present in the changeset are
/// emitted; an absent field is left untouched by the remote.
#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    lb_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    members: Option<Vec<MemberData>>,
}

impl UpdateBody {
    pub(crate) fn from_changes(changes: &LoadBalancerChanges) -> Self {
        Self {
            lb_method: changes.lb_method.clone(),
            members: changes
                .members
                .as_ref()
                .map(|members| members.iter().map(MemberData::from).collect()),
        }
    }

    pub(crate) fn members_only(members: &[Member]) -> Self {
        Self {
            lb_method: None,
            members: Some(members.iter().map(MemberData::from).collect()),
        }
    }
}

/// Member as it appears on the wire; the computed status never travels up.
#[derive(Debug, Serialize)]
struct MemberData {
    ip: String,
    port: u16,
    weight: u32,
}

impl From<&Member> for MemberData {
    fn from(member: &Member) -> Self {
        Self {
            ip: member.ip.clone(),
            port: member.port,
            weight: member.weight,
        }
    }
}

/// Encode a create body as a JSON value.
pub(crate) fn encode_create(spec: &LoadBalancerSpec) -> Result<Value> {
    Ok(serde_json::to_value(CreateBody::from_spec(spec))?)
}

/// Encode an update body as a JSON value.
pub(crate) fn encode_update(body: &UpdateBody) -> Result<Value> {
    Ok(serde_json::to_value(body)?)
}

/// Decode a single load balancer response body.
pub fn decode_loadbalancer(body: &str) -> Result<LoadBalancer> {
    let wire: WireLoadBalancer = serde_json::from_str(body)
        .map_err(|e| Error::decode("load balancer response", with_context(&e, body)))?;
    Ok(wire.into_model())
}

/// Decode a list response body.
pub fn decode_loadbalancer_list(body: &str) -> Result<Vec<LoadBalancer>> {
    let wire: Vec<WireLoadBalancer> = serde_json::from_str(body)
        .map_err(|e| Error::decode("load balancer list response", with_context(&e, body)))?;
    Ok(wire.into_iter().map(WireLoadBalancer::into_model).collect())
}

fn with_context(error: &serde_json::Error, body: &str) -> String {
    let snippet: String = body.chars().take(200).collect();
    format!("{error}; body: {snippet}")
}

#[derive(Debug, Deserialize)]
struct WireMember {
    #[serde(default)]
    ip: String,
    #[serde(default = "default_port", deserialize_with = "coerce::port")]
    port: u16,
    #[serde(default = "default_weight", deserialize_with = "coerce::weight")]
    weight: u32,
    #[serde(default)]
    status: Option<String>,
}

const fn default_port() -> u16 {
    DEFAULT_MEMBER_PORT
}

const fn default_weight() -> u32 {
    DEFAULT_MEMBER_WEIGHT
}

#[derive(Debug, Deserialize)]
struct WireMonitor {
    #[serde(default, deserialize_with = "coerce::int")]
    delay: i64,
    #[serde(default)]
    expected_codes: Option<String>,
    #[serde(default)]
    http_method: Option<String>,
    #[serde(default, deserialize_with = "coerce::int")]
    max_retries: i64,
    #[serde(default)]
    monitor_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::int")]
    timeout: i64,
    #[serde(default)]
    url_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLoadBalancer {
    #[serde(deserialize_with = "coerce::id")]
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    lb_method: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default, deserialize_with = "coerce::int")]
    protocol_port: i64,
    #[serde(default)]
    private_net: Option<Value>,
    #[serde(default)]
    members: Vec<WireMember>,
    #[serde(default)]
    monitor: Option<WireMonitor>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    status_reason: Option<String>,
    #[serde(default)]
    vip: Option<String>,
    #[serde(default, deserialize_with = "coerce::int")]
    active_connections: i64,
    #[serde(default, deserialize_with = "coerce::int")]
    total_connections: i64,
    #[serde(default)]
    create_time: Option<String>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    waf: Option<Value>,
}

impl WireLoadBalancer {
    fn into_model(self) -> LoadBalancer {
        LoadBalancer {
            id: self.id,
            name: self.name.unwrap_or_default(),
            desc: self.desc.unwrap_or_default(),
            lb_method: self.lb_method.unwrap_or_default(),
            protocol: self.protocol.unwrap_or_default(),
            protocol_port: u16::try_from(self.protocol_port).unwrap_or_default(),
            private_net: self.private_net.as_ref().map(flatten_net_ref).unwrap_or_default(),
            members: self
                .members
                .into_iter()
                .map(|m| Member {
                    ip: m.ip,
                    port: m.port,
                    weight: m.weight,
                    status: m.status,
                })
                .collect(),
            monitor: self.monitor.map(|m| Monitor {
                delay: m.delay,
                expected_codes: m.expected_codes.unwrap_or_default(),
                http_method: m.http_method.unwrap_or_default(),
                max_retries: m.max_retries,
                monitor_type: m.monitor_type.unwrap_or_default(),
                timeout: m.timeout,
                url_path: m.url_path.unwrap_or_default(),
            }),
            status: self.status.unwrap_or_default(),
            status_reason: self.status_reason.unwrap_or_default(),
            vip: self.vip.unwrap_or_default(),
            active_connections: self.active_connections,
            total_connections: self.total_connections,
            create_time: self.create_time.unwrap_or_default(),
            user: self.user.as_ref().and_then(string_map),
            waf: self.waf.as_ref().and_then(string_map),
        }
    }
}

/// Flatten a network reference that may arrive as a string, a bare id, or
/// a nested object carrying an id.
fn flatten_net_ref(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(_) => scalar_to_string(value).unwrap_or_default(),
        Value::Object(map) => map.get("id").and_then(scalar_to_string).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Convert a JSON object into a string map, stringifying scalar values and
/// normalizing float-encoded integers (a `waf.id` of `5.0` becomes `"5"`).
fn string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    let map = value.as_object()?;
    Some(
        map.iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect(),
    )
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| (f as i64).to_string())
            }
        }
        _ => None,
    }
}

/// Deserializers that coerce the remote's float-encoded numerics.
mod coerce {
    use serde::de::{Deserializer, Error as DeError};
    use serde::Deserialize;
    use serde_json::Value;

    use super::{default_port, default_weight};

    fn as_i64<E: DeError>(value: &Value, what: &str) -> Result<i64, E> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| E::custom(format!("{what} out of integer range"))),
            other => Err(E::custom(format!("expected number for {what}, got {other}"))),
        }
    }

    pub(super) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(0),
            value => as_i64(&value, "integer field"),
        }
    }

    pub(super) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let id = as_i64(&value, "id")?;
        u64::try_from(id).map_err(|_| D::Error::custom("id must not be negative"))
    }

    pub(super) fn port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(default_port()),
            value => {
                let port = as_i64(&value, "port")?;
                u16::try_from(port).map_err(|_| D::Error::custom("port out of range"))
            }
        }
    }

    pub(super) fn weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(default_weight()),
            value => {
                let weight = as_i64(&value, "weight")?;
                u32::try_from(weight).map_err(|_| D::Error::custom("weight out of range"))
            }
        }
    }
}

fn str_is_empty(s: &&str) -> bool {
    s.is_empty()
}

const fn int_is_zero(v: &i64) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_create_omits_unset_monitor_fields() -> Result<()> {
        let spec = LoadBalancerSpec::new("lb1", "ROUND_ROBIN", "HTTP", 80, "net1");
        let body = encode_create(&spec)?;

        assert_eq!(
            body,
            json!({
                "lb_method": "ROUND_ROBIN",
                "name": "lb1",
                "private_net": "net1",
                "protocol": "HTTP",
                "protocol_port": 80,
            })
        );
        Ok(())
    }

    #[test]
    fn test_encode_create_carries_monitor_fields_flat() -> Result<()> {
        let monitor = Monitor::new("HTTP")
            .with_delay(30)
            .with_max_retries(3)
            .with_timeout(5)
            .with_expected_codes("200")
            .with_http_method("GET")
            .with_url_path("/health");
        let spec = LoadBalancerSpec::new("lb1", "ROUND_ROBIN", "HTTP", 80, "net1")
            .with_desc("front door")
            .with_monitor(monitor);
        let body = encode_create(&spec)?;

        assert_eq!(
            body,
            json!({
                "delay": 30,
                "desc": "front door",
                "expected_codes": "200",
                "http_method": "GET",
                "lb_method": "ROUND_ROBIN",
                "max_retries": 3,
                "monitor_type": "HTTP",
                "name": "lb1",
                "private_net": "net1",
                "protocol": "HTTP",
                "protocol_port": 80,
                "timeout": 5,
                "url_path": "/health",
            })
        );
        Ok(())
    }

    #[test]
    fn test_encode_update_emits_only_changed_fields() -> Result<()> {
        let changes = LoadBalancerChanges::lb_method("SOURCE_IP");
        let body = encode_update(&UpdateBody::from_changes(&changes))?;
        assert_eq!(body, json!({"lb_method": "SOURCE_IP"}));

        let changes =
            LoadBalancerChanges::members(vec![Member::new("10.0.0.1").with_port(8080)]);
        let body = encode_update(&UpdateBody::from_changes(&changes))?;
        assert_eq!(
            body,
            json!({"members": [{"ip": "10.0.0.1", "port": 8080, "weight": 1}]})
        );
        Ok(())
    }

    #[test]
    fn test_decode_coerces_float_numerics() -> Result<()> {
        let body = r#"{
            "id": 7.0,
            "lb_method": "ROUND_ROBIN",
            "status": "ACTIVE",
            "active_connections": 12.0,
            "total_connections": 3400.0,
            "members": [{"ip": "10.0.0.1", "port": 8080.0, "weight": 2.0, "status": "ACTIVE"}],
            "monitor": {"delay": 30.0, "max_retries": 3.0, "timeout": 5.0, "monitor_type": "HTTP"}
        }"#;

        let lb = decode_loadbalancer(body)?;
        assert_eq!(lb.id, 7);
        assert_eq!(lb.active_connections, 12);
        assert_eq!(lb.total_connections, 3400);
        let member = lb.members.first().ok_or_else(|| Error::decode("test", "no member"))?;
        assert_eq!(member.port, 8080);
        assert_eq!(member.weight, 2);
        let monitor = lb.monitor.as_ref().ok_or_else(|| Error::decode("test", "no monitor"))?;
        assert_eq!(monitor.delay, 30);
        assert_eq!(monitor.max_retries, 3);
        assert_eq!(monitor.monitor_type, "HTTP");
        Ok(())
    }

    #[test]
    fn test_decode_defaults_and_normalizes() -> Result<()> {
        let body = r#"{
            "id": 7,
            "status": "ACTIVE",
            "members": [{"ip": "10.0.0.1"}],
            "private_net": {"id": 42.0, "name": "net1"},
            "waf": {"id": 5.0, "name": "waf1"},
            "an_unknown_field": true
        }"#;

        let lb = decode_loadbalancer(body)?;
        let member = lb.members.first().ok_or_else(|| Error::decode("test", "no member"))?;
        assert_eq!(member.port, DEFAULT_MEMBER_PORT);
        assert_eq!(member.weight, DEFAULT_MEMBER_WEIGHT);
        assert_eq!(lb.private_net, "42");
        let waf = lb.waf.as_ref().ok_or_else(|| Error::decode("test", "no waf"))?;
        assert_eq!(waf.get("id").map(String::as_str), Some("5"));
        assert_eq!(waf.get("name").map(String::as_str), Some("waf1"));
        Ok(())
    }

    #[test]
    fn test_decode_absent_monitor_and_user_are_none() -> Result<()> {
        let lb = decode_loadbalancer(r#"{"id": 7, "status": "ACTIVE", "monitor": null}"#)?;
        assert_eq!(lb.monitor, None);
        assert_eq!(lb.user, None);
        Ok(())
    }

    #[test]
    fn test_decode_without_id_is_an_error() {
        let result = decode_loadbalancer(r#"{"status": "ACTIVE"}"#);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_decode_malformed_body_carries_context() {
        let err = decode_loadbalancer("<html>busy</html>").err().map(|e| e.to_string());
        assert!(err.as_ref().is_some_and(|m| m.contains("busy")));
    }

    #[test]
    fn test_round_trip_preserves_schema_fields() -> Result<()> {
        let response = r#"{
            "id": 11,
            "name": "lb1",
            "desc": "front door",
            "lb_method": "ROUND_ROBIN",
            "protocol": "HTTP",
            "protocol_port": 80,
            "private_net": "net1",
            "status": "ACTIVE",
            "members": [
                {"ip": "10.0.0.1", "port": 8080, "weight": 1, "status": "ACTIVE"},
                {"ip": "10.0.0.2", "port": 8080, "weight": 2, "status": "DOWN"}
            ],
            "monitor": {
                "delay": 30, "expected_codes": "200", "http_method": "GET",
                "max_retries": 3, "monitor_type": "HTTP", "timeout": 5, "url_path": "/health"
            }
        }"#;

        let observed = decode_loadbalancer(response)?;
        let spec = LoadBalancerSpec::new(
            observed.name.clone(),
            observed.lb_method.clone(),
            observed.protocol.clone(),
            observed.protocol_port,
            observed.private_net.clone(),
        )
        .with_desc(observed.desc.clone())
        .with_members(observed.members.clone())
        .with_monitor(observed.monitor.clone().ok_or_else(|| Error::decode("test", "no monitor"))?);

        let body = encode_create(&spec)?;
        assert_eq!(body.get("name"), Some(&json!("lb1")));
        assert_eq!(body.get("desc"), Some(&json!("front door")));
        assert_eq!(body.get("delay"), Some(&json!(30)));
        assert_eq!(body.get("expected_codes"), Some(&json!("200")));
        assert_eq!(body.get("url_path"), Some(&json!("/health")));

        let update = encode_update(&UpdateBody::members_only(&spec.members))?;
        assert_eq!(
            update,
            json!({"members": [
                {"ip": "10.0.0.1", "port": 8080, "weight": 1},
                {"ip": "10.0.0.2", "port": 8080, "weight": 2}
            ]})
        );
        Ok(())
    }
}
