//! Execution filters: which mojo executions a binding applies to.

use serde::{Deserialize, Serialize};

use crate::config::ConfigNode;
use crate::error::MappingError;
use crate::model::ExecutionKey;
use crate::version::{Version, VersionRange};

/// Declarative pattern selecting mojo executions.
///
/// Matching is structural, not glob-based: every present field must agree
/// with the execution, absent or empty fields match anything. A filter with
/// no fields at all is a deliberate catch-all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub artifact_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version_range: Option<VersionRange>,
	/// Goal names this filter applies to; empty means any goal.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub goals: Vec<String>,
}

impl ExecutionFilter {
	/// Filter that matches every execution.
	pub fn match_all() -> Self {
		Self::default()
	}

	pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
		self.group_id = Some(group_id.into());
		self
	}

	pub fn with_artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
		self.artifact_id = Some(artifact_id.into());
		self
	}

	pub fn with_version_range(mut self, range: VersionRange) -> Self {
		self.version_range = Some(range);
		self
	}

	pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
		self.goals.push(goal.into());
		self
	}

	/// Projects a `pluginExecutionFilter` element.
	///
	/// The version range is parsed here so that [`matches`](Self::matches)
	/// stays total; a bad range spec is a malformed declaration.
	pub fn from_config(node: &ConfigNode) -> Result<Self, MappingError> {
		let version_range = match node.child_text("versionRange") {
			Some(spec) => Some(VersionRange::parse(spec)?),
			None => None,
		};
		let goals = node
			.child("goals")
			.map(|goals| {
				goals
					.children_named("goal")
					.filter_map(ConfigNode::text)
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();
		Ok(Self {
			group_id: node.child_text("groupId").map(str::to_string),
			artifact_id: node.child_text("artifactId").map(str::to_string),
			version_range,
			goals,
		})
	}

	/// True when this filter applies to `execution`. Pure and total.
	pub fn matches(&self, execution: &ExecutionKey) -> bool {
		if let Some(group_id) = &self.group_id
			&& group_id != &execution.group_id
		{
			return false;
		}
		if let Some(artifact_id) = &self.artifact_id
			&& artifact_id != &execution.artifact_id
		{
			return false;
		}
		if let Some(range) = &self.version_range
			&& !range.matches(&Version::parse(&execution.version))
		{
			return false;
		}
		if !self.goals.is_empty() && !self.goals.iter().any(|goal| goal == &execution.goal) {
			return false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn execution() -> ExecutionKey {
		ExecutionKey::new("org.x", "plugin", "1.2", "compile")
	}

	#[test]
	fn empty_filter_matches_everything() {
		assert!(ExecutionFilter::match_all().matches(&execution()));
	}

	#[test]
	fn partial_filter_with_goal_set() {
		let filter = ExecutionFilter::match_all()
			.with_artifact_id("plugin")
			.with_goal("compile")
			.with_goal("testCompile");
		assert!(filter.matches(&execution()));
	}

	#[test]
	fn group_id_mismatch() {
		let filter = ExecutionFilter::match_all().with_group_id("org.y");
		assert!(!filter.matches(&execution()));
	}

	#[test]
	fn goal_outside_the_set_never_matches() {
		let filter = ExecutionFilter::match_all()
			.with_group_id("org.x")
			.with_artifact_id("plugin")
			.with_goal("package");
		assert!(!filter.matches(&execution()));
	}

	#[test]
	fn version_range_is_honored() {
		let in_range = ExecutionFilter::match_all()
			.with_version_range(VersionRange::parse("[1.0,2.0)").unwrap());
		assert!(in_range.matches(&execution()));

		let out_of_range = ExecutionFilter::match_all()
			.with_version_range(VersionRange::parse("[2.0,)").unwrap());
		assert!(!out_of_range.matches(&execution()));
	}

	#[test]
	fn projection_reads_all_fields() {
		let node = ConfigNode::new("pluginExecutionFilter")
			.with_child(ConfigNode::leaf("groupId", "org.x"))
			.with_child(ConfigNode::leaf("artifactId", "plugin"))
			.with_child(ConfigNode::leaf("versionRange", "[1.0,2.0)"))
			.with_child(
				ConfigNode::new("goals")
					.with_child(ConfigNode::leaf("goal", "compile"))
					.with_child(ConfigNode::leaf("goal", "testCompile")),
			);
		let filter = ExecutionFilter::from_config(&node).unwrap();
		assert_eq!(filter.group_id.as_deref(), Some("org.x"));
		assert_eq!(filter.goals, vec!["compile", "testCompile"]);
		assert!(filter.matches(&execution()));
	}

	#[test]
	fn projection_rejects_bad_range() {
		let node = ConfigNode::new("pluginExecutionFilter")
			.with_child(ConfigNode::leaf("versionRange", "[1.0"));
		assert!(matches!(
			ExecutionFilter::from_config(&node),
			Err(MappingError::Malformed(_))
		));
	}
}
