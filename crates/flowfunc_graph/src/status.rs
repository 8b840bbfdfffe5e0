// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reflect externally reported execution status on rendered nodes.

use crate::surface::NodeSurface;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Execution status reported by the host for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Running
    Started,
    /// Waiting for a worker
    Queued,
    /// Postponed
    Deferred,
    /// Completed successfully
    Finished,
    /// Canceled before completion
    Canceled,
    /// Stopped by the user
    Stopped,
    /// Scheduled for later
    Scheduled,
    /// Completed with an error
    Failed,
}

impl NodeStatus {
    /// Every status
    pub const ALL: [NodeStatus; 8] = [
        Self::Started,
        Self::Queued,
        Self::Deferred,
        Self::Finished,
        Self::Canceled,
        Self::Stopped,
        Self::Scheduled,
        Self::Failed,
    ];

    /// CSS class marking this status
    pub fn class(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Queued => "queued",
            Self::Deferred => "deferred",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
            Self::Stopped => "stopped",
            Self::Scheduled => "scheduled",
            Self::Failed => "failed",
        }
    }

    /// Every status class
    pub fn all_classes() -> [&'static str; 8] {
        Self::ALL.map(|status| status.class())
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// Node id to status, as reported by the host
pub type StatusTable = IndexMap<String, NodeStatus>;

/// Deserialize an optional status table, dropping null and unrecognized entries.
///
/// For use with `#[serde(deserialize_with = ...)]` on host props, so one bad
/// entry does not reject the whole update.
pub fn lenient_status_table<'de, D>(deserializer: D) -> Result<Option<StatusTable>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|raw| {
        raw.into_iter()
            .filter_map(|(node_id, value)| {
                if value.is_null() {
                    return None;
                }
                match NodeStatus::deserialize(&value) {
                    Ok(status) => Some((node_id, status)),
                    Err(e) => {
                        tracing::debug!("Ignoring status of '{}': {}", node_id, e);
                        None
                    }
                }
            })
            .collect()
    }))
}

/// Outcome of one [`apply_statuses`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Node ids whose status class was set
    pub applied: Vec<String>,
    /// Node ids with no element on the surface
    pub missing: Vec<String>,
}

/// Replace each listed node's status class with its reported status.
///
/// Nodes missing from the surface are skipped. A missing or empty table does
/// nothing.
pub fn apply_statuses<S: NodeSurface + ?Sized>(
    surface: &mut S,
    table: Option<&StatusTable>,
) -> StatusReport {
    let mut report = StatusReport::default();
    let Some(table) = table else {
        return report;
    };

    let classes = NodeStatus::all_classes();
    for (node_id, status) in table {
        let result = surface
            .remove_node_classes(node_id, &classes)
            .and_then(|()| surface.add_node_class(node_id, status.class()));
        match result {
            Ok(()) => report.applied.push(node_id.clone()),
            Err(e) => {
                tracing::debug!("Status '{}' not shown: {}", status, e);
                report.missing.push(node_id.clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ElementTree, ACTIVE_CLASS};

    #[test]
    fn test_status_replaces_previous() {
        let mut tree = ElementTree::new();
        tree.append_node("n1");
        tree.add_node_class("n1", ACTIVE_CLASS).unwrap();

        let mut table = StatusTable::new();
        table.insert("n1".to_string(), NodeStatus::Queued);
        apply_statuses(&mut tree, Some(&table));
        assert_eq!(tree.node_classes("n1"), vec!["Node_wrapper__2O2Ng", "active", "queued"]);

        table.insert("n1".to_string(), NodeStatus::Finished);
        let report = apply_statuses(&mut tree, Some(&table));
        assert_eq!(report.applied, vec!["n1".to_string()]);
        assert_eq!(
            tree.node_classes("n1"),
            vec!["Node_wrapper__2O2Ng", "active", "finished"]
        );
    }

    #[test]
    fn test_missing_node_is_skipped() {
        let mut tree = ElementTree::new();
        tree.append_node("n1");
        let before = tree.node_classes("n1").join(" ");

        let mut table = StatusTable::new();
        table.insert("missing-id".to_string(), NodeStatus::Failed);
        let report = apply_statuses(&mut tree, Some(&table));

        assert!(report.applied.is_empty());
        assert_eq!(report.missing, vec!["missing-id".to_string()]);
        assert_eq!(tree.node_classes("n1").join(" "), before);
    }

    #[test]
    fn test_empty_or_missing_table() {
        let mut tree = ElementTree::new();
        tree.append_node("n1");
        assert_eq!(apply_statuses(&mut tree, None), StatusReport::default());
        assert_eq!(
            apply_statuses(&mut tree, Some(&StatusTable::new())),
            StatusReport::default()
        );
    }

    #[test]
    fn test_status_table_from_json() {
        let table: StatusTable =
            serde_json::from_str(r#"{"a": "started", "b": "canceled"}"#).unwrap();
        assert_eq!(table["a"], NodeStatus::Started);
        assert_eq!(table["b"].class(), "canceled");
        assert!(serde_json::from_str::<StatusTable>(r#"{"a": "exploded"}"#).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_status_table")]
        table: Option<StatusTable>,
    }

    #[test]
    fn test_lenient_table_drops_bad_entries() {
        let holder: Holder = serde_json::from_str(
            r#"{"table": {"n1": "started", "n2": null, "n3": "running", "n4": 7}}"#,
        )
        .unwrap();
        let table = holder.table.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["n1"], NodeStatus::Started);

        let holder: Holder = serde_json::from_str(r#"{"table": null}"#).unwrap();
        assert!(holder.table.is_none());
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.table.is_none());
    }
}
