//! Typed wrapper for a cluster object received from the controller.

use crate::node::Node;
use crate::variant::{Variant, VariantMap};

/// A managed cluster as a property mapping with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    properties: VariantMap,
}

impl Cluster {
    /// Wraps a received property mapping.
    #[must_use]
    pub fn from_properties(properties: VariantMap) -> Self {
        Self { properties }
    }

    /// The value of the named property, or the invalid variant when unset.
    #[must_use]
    pub fn property(&self, name: &str) -> Variant {
        self.properties.get(name).cloned().unwrap_or_default()
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

    /// The numeric cluster ID.
    #[must_use]
    pub fn cluster_id(&self) -> i64 {
        self.property("cluster_id").to_int(0)
    }

    /// The cluster name.
    #[must_use]
    pub fn name(&self) -> String {
        self.property("cluster_name").to_string()
    }

    /// The user that owns the cluster.
    #[must_use]
    pub fn owner_name(&self) -> String {
        self.property("owner_user_name").to_string()
    }

    /// The group that owns the cluster.
    #[must_use]
    pub fn group_owner_name(&self) -> String {
        self.property("owner_group_name").to_string()
    }

    /// The cluster type (`galera`, `replication`, ...).
    #[must_use]
    pub fn cluster_type(&self) -> String {
        self.property("cluster_type").to_string()
    }

    /// The cluster state (`STARTED`, `DEGRADED`, `FAILURE`, ...).
    #[must_use]
    pub fn state(&self) -> String {
        self.property("state").to_string()
    }

    /// The last human-readable status line.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.property("status_text").to_string()
    }

    /// Vendor and version in one display string.
    #[must_use]
    pub fn vendor_and_version(&self) -> String {
        let vendor = self.property("vendor").to_string();
        let version = self.property("version").to_string();

        if vendor.is_empty() {
            version
        } else if version.is_empty() {
            vendor
        } else {
            format!("{vendor} {version}")
        }
    }

    /// Number of critical alarms currently raised.
    #[must_use]
    pub fn alarms_critical(&self) -> i64 {
        self.alarm_statistics().get("critical").map_or(0, |v| v.to_int(0))
    }

    /// Number of warning alarms currently raised.
    #[must_use]
    pub fn alarms_warning(&self) -> i64 {
        self.alarm_statistics().get("warning").map_or(0, |v| v.to_int(0))
    }

    /// Number of jobs aborted on this cluster.
    #[must_use]
    pub fn jobs_aborted(&self) -> i64 {
        self.job_count("ABORTED")
    }

    /// Number of jobs defined but not yet queued.
    #[must_use]
    pub fn jobs_defined(&self) -> i64 {
        self.job_count("DEFINED")
    }

    /// Number of jobs waiting in the queue.
    #[must_use]
    pub fn jobs_dequeued(&self) -> i64 {
        self.job_count("DEQUEUED")
    }

    /// Number of failed jobs.
    #[must_use]
    pub fn jobs_failed(&self) -> i64 {
        self.job_count("FAILED")
    }

    /// Number of finished jobs.
    #[must_use]
    pub fn jobs_finished(&self) -> i64 {
        self.job_count("FINISHED")
    }

    /// Number of jobs currently running.
    #[must_use]
    pub fn jobs_running(&self) -> i64 {
        self.job_count("RUNNING")
    }

    /// The hosts of the cluster as typed nodes.
    #[must_use]
    pub fn hosts(&self) -> Vec<Node> {
        self.property("hosts")
            .to_variant_list()
            .iter()
            .map(|item| Node::from_properties(item.to_variant_map().clone()))
            .collect()
    }

    fn alarm_statistics(&self) -> VariantMap {
        self.property("alarm_statistics").to_variant_map().clone()
    }

    fn job_count(&self, state: &str) -> i64 {
        self.property("job_statistics")
            .to_variant_map()
            .get("by_state")
            .map_or(0, |by_state| {
                by_state.to_variant_map().get(state).map_or(0, |v| v.to_int(0))
            })
    }
}

impl From<VariantMap> for Cluster {
    fn from(properties: VariantMap) -> Self {
        Self::from_properties(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cluster() -> Cluster {
        let doc = br#"{
            "class_name": "cluster",
            "cluster_id": 1,
            "cluster_name": "galera_001",
            "cluster_type": "galera",
            "state": "STARTED",
            "status_text": "All nodes are operational.",
            "owner_user_name": "grumio",
            "vendor": "percona",
            "version": "8.0",
            "alarm_statistics": { "critical": 1, "warning": 3 },
            "job_statistics": {
                "by_state": { "FINISHED": 8, "RUNNING": 1, "FAILED": 2 }
            },
            "hosts": [
                { "hostname": "db-1", "port": 3306, "role": "master" },
                { "hostname": "db-2", "port": 3306, "role": "slave" }
            ]
        }"#;
        Cluster::from_properties(crate::Variant::parse_object(doc).unwrap())
    }

    #[test]
    fn accessors_read_cluster_properties() {
        let cluster = sample_cluster();
        assert_eq!(cluster.cluster_id(), 1);
        assert_eq!(cluster.name(), "galera_001");
        assert_eq!(cluster.cluster_type(), "galera");
        assert_eq!(cluster.state(), "STARTED");
        assert_eq!(cluster.owner_name(), "grumio");
        assert_eq!(cluster.vendor_and_version(), "percona 8.0");
    }

    #[test]
    fn alarm_and_job_statistics() {
        let cluster = sample_cluster();
        assert_eq!(cluster.alarms_critical(), 1);
        assert_eq!(cluster.alarms_warning(), 3);
        assert_eq!(cluster.jobs_finished(), 8);
        assert_eq!(cluster.jobs_running(), 1);
        assert_eq!(cluster.jobs_failed(), 2);
        assert_eq!(cluster.jobs_aborted(), 0);
    }

    #[test]
    fn hosts_become_typed_nodes() {
        let hosts = sample_cluster().hosts();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].host_name(), "db-1");
        assert_eq!(hosts[1].role(), "slave");
    }

    #[test]
    fn empty_cluster_uses_defaults() {
        let cluster = Cluster::default();
        assert_eq!(cluster.cluster_id(), 0);
        assert_eq!(cluster.name(), "");
        assert_eq!(cluster.vendor_and_version(), "");
        assert_eq!(cluster.jobs_running(), 0);
    }
}
