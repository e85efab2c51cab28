//! Typed wrapper for a node/host object received from the controller.
//!
//! A [`Node`] is a thin view over the property mapping the controller sends
//! for each host: the accessors read well-known keys and fall back to the
//! usual conversion defaults when a property is missing. Unknown properties
//! are kept verbatim, so a node survives a round trip through the value
//! model without loss.

use crate::variant::{Variant, VariantMap};

/// The `class_name` property written when a node is built locally.
const NODE_CLASS_NAME: &str = "host";

/// A cluster node (host/server) as a property mapping with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Node {
    properties: VariantMap,
}

impl Node {
    /// Creates an empty node with only its `class_name` property set.
    #[must_use]
    pub fn new() -> Self {
        let mut node = Self::empty();
        node.properties
            .insert("class_name".into(), Variant::from(NODE_CLASS_NAME));
        node
    }

    /// A node with no properties at all. Used for the shared empty value
    /// the variant conversions hand out.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            properties: VariantMap::new(),
        }
    }

    /// Wraps a received property mapping, defaulting `class_name` when the
    /// controller did not send one.
    #[must_use]
    pub fn from_properties(properties: VariantMap) -> Self {
        let mut node = Self { properties };
        node.properties
            .entry("class_name".into())
            .or_insert_with(|| Variant::from(NODE_CLASS_NAME));
        node
    }

    /// True if a property with the given key exists.
    #[must_use]
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// The value of the named property, or the invalid variant when unset.
    #[must_use]
    pub fn property(&self, name: &str) -> Variant {
        self.properties.get(name).cloned().unwrap_or_default()
    }

    /// Sets a property to an already-typed value.
    pub fn set_property(&mut self, name: &str, value: impl Into<Variant>) {
        self.properties.insert(name.to_owned(), value.into());
    }

    /// Sets a property from a literal string, sniffing booleans and
    /// integers into their typed form. An empty value removes the property.
    pub fn set_property_literal(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.properties.remove(name);
            return;
        }

        self.properties
            .insert(name.to_owned(), Variant::from_literal(value));
    }

    /// Replaces all properties in one step.
    pub fn set_properties(&mut self, properties: VariantMap) {
        self.properties = properties;
    }

    /// The underlying property mapping.
    #[must_use]
    pub fn to_variant_map(&self) -> &VariantMap {
        &self.properties
    }

    /// The controller-side class name of the object.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.property("class_name").to_string()
    }

    /// The display name: the alias when one is set, the host name
    /// otherwise.
    #[must_use]
    pub fn name(&self) -> String {
        let alias = self.property("alias").to_string();
        if alias.is_empty() {
            self.host_name()
        } else {
            alias
        }
    }

    /// The host name of the node.
    #[must_use]
    pub fn host_name(&self) -> String {
        self.property("hostname").to_string()
    }

    /// The resolved IP address, when reported.
    #[must_use]
    pub fn ip_address(&self) -> String {
        self.property("ip").to_string()
    }

    /// True when the controller reported a service port for the node.
    #[must_use]
    pub fn has_port(&self) -> bool {
        self.has_property("port")
    }

    /// The service port, or 0 when not reported.
    #[must_use]
    pub fn port(&self) -> i64 {
        self.property("port").to_int(0)
    }

    /// The role the node plays in its cluster (e.g. `master`, `slave`,
    /// `controller`).
    #[must_use]
    pub fn role(&self) -> String {
        self.property("role").to_string()
    }

    /// The host status string (`CmonHostOnline` and friends).
    #[must_use]
    pub fn host_status(&self) -> String {
        self.property("hoststatus").to_string()
    }

    /// The node type (`mysql`, `postgres`, `controller`, ...).
    #[must_use]
    pub fn node_type(&self) -> String {
        self.property("nodetype").to_string()
    }

    /// The version string of the managed service on the node.
    #[must_use]
    pub fn version(&self) -> String {
        self.property("version").to_string()
    }

    /// The last human-readable status message.
    #[must_use]
    pub fn message(&self) -> String {
        self.property("message").to_string()
    }

    /// True when the controller currently has a connection to the node.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.property("connected").to_boolean(false)
    }

    /// True while a maintenance period is active for the node.
    #[must_use]
    pub fn maintenance_active(&self) -> bool {
        self.property("maintenance_mode_active").to_boolean(false)
    }

    /// Unix timestamp of the last successful contact.
    #[must_use]
    pub fn last_seen(&self) -> u64 {
        self.property("lastseen").to_unsigned_long(0)
    }

    /// Process ID of the managed service, or 0.
    #[must_use]
    pub fn pid(&self) -> i64 {
        self.property("pid").to_int(0)
    }

    /// Service uptime in seconds.
    #[must_use]
    pub fn uptime(&self) -> u64 {
        self.property("uptime").to_unsigned_long(0)
    }
}

impl From<VariantMap> for Node {
    fn from(properties: VariantMap) -> Self {
        Self::from_properties(properties)
    }
}
