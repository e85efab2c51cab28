//! The decoded reply of one RPC call.

use pincer_proto::{map_to_json, Cluster, Node, Variant, VariantList, VariantMap};

/// A reply wrapped around the variant mapping the controller sent.
///
/// A reply that failed to decode still exists as an `RpcReply`; its
/// [`RpcReply::is_ok`] predicate is false and [`RpcReply::error_string`]
/// carries the decoder's message. Transport failures, by contrast, never
/// produce a reply at all.
#[derive(Debug, Clone, Default)]
pub struct RpcReply {
    map: VariantMap,
}

impl RpcReply {
    /// Wraps a decoded reply mapping.
    #[must_use]
    pub fn new(map: VariantMap) -> Self {
        Self { map }
    }

    /// A synthetic not-OK reply describing a body that could not be
    /// decoded.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        let mut map = VariantMap::new();
        map.insert("request_status".into(), Variant::from("ParseError"));
        map.insert("error_string".into(), Variant::from(message.into()));
        Self { map }
    }

    /// True when the controller marked the request as processed
    /// successfully.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.request_status().eq_ignore_ascii_case("ok")
    }

    /// The `request_status` field of the reply.
    #[must_use]
    pub fn request_status(&self) -> String {
        self.property("request_status").to_string()
    }

    /// The error message of a not-OK reply, empty otherwise.
    #[must_use]
    pub fn error_string(&self) -> String {
        self.property("error_string").to_string()
    }

    /// One top-level field of the reply.
    #[must_use]
    pub fn property(&self, name: &str) -> Variant {
        self.map.get(name).cloned().unwrap_or_default()
    }

    /// The clusters of a cluster-listing reply as typed objects.
    #[must_use]
    pub fn clusters(&self) -> Vec<Cluster> {
        self.property("clusters")
            .to_variant_list()
            .iter()
            .map(|item| Cluster::from_properties(item.to_variant_map().clone()))
            .collect()
    }

    /// Every host of every cluster in the reply as typed nodes.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.clusters()
            .iter()
            .flat_map(Cluster::hosts)
            .collect()
    }

    /// The job list of a job-listing reply.
    #[must_use]
    pub fn jobs(&self) -> VariantList {
        self.property("jobs").to_variant_list().clone()
    }

    /// The single job object of a job reply.
    #[must_use]
    pub fn job(&self) -> VariantMap {
        self.property("job").to_variant_map().clone()
    }

    /// The message list of a job log reply.
    #[must_use]
    pub fn job_messages(&self) -> VariantList {
        self.property("messages").to_variant_list().clone()
    }

    /// The underlying variant mapping.
    #[must_use]
    pub fn to_variant_map(&self) -> &VariantMap {
        &self.map
    }

    /// The full reply rendered as pretty-printed JSON.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&map_to_json(&self.map))
            .unwrap_or_else(|_| String::from("{}"))
    }
}
