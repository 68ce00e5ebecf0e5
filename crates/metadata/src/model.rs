//! Lifecycle mapping metadata records.
//!
//! Plain immutable records, either projected from a parsed metadata
//! document or registered statically by a host. The binding action is a
//! tagged variant carrying exactly the data its behavior needs; there is no
//! behavior hierarchy here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigNode;
use crate::error::MappingError;
use crate::filter::ExecutionFilter;

/// One concrete plugin goal invocation within a project build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionKey {
	pub group_id: String,
	pub artifact_id: String,
	pub version: String,
	pub goal: String,
}

impl ExecutionKey {
	pub fn new(
		group_id: impl Into<String>,
		artifact_id: impl Into<String>,
		version: impl Into<String>,
		goal: impl Into<String>,
	) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
			version: version.into(),
			goal: goal.into(),
		}
	}
}

impl fmt::Display for ExecutionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}:{} ({})",
			self.group_id, self.artifact_id, self.version, self.goal
		)
	}
}

/// What happens when a binding's filter matches an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingAction {
	/// Skip the execution entirely.
	Ignore,
	/// Run the mojo the way the build engine would.
	Execute,
	/// Hand the execution to a registered configurator.
	Delegate { configurator_id: String },
}

/// A configurator binding: when `filter` matches an execution, apply
/// `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionBinding {
	pub filter: ExecutionFilter,
	pub action: BindingAction,
	/// The action's element subtree, kept untyped for action-specific
	/// knobs such as `runOnIncremental`.
	#[serde(default)]
	pub configuration: ConfigNode,
}

impl ExecutionBinding {
	pub fn ignore(filter: ExecutionFilter) -> Self {
		Self {
			filter,
			action: BindingAction::Ignore,
			configuration: ConfigNode::new("ignore"),
		}
	}

	pub fn execute(filter: ExecutionFilter) -> Self {
		Self {
			filter,
			action: BindingAction::Execute,
			configuration: ConfigNode::new("execute"),
		}
	}

	pub fn delegate(filter: ExecutionFilter, configurator_id: impl Into<String>) -> Self {
		Self {
			filter,
			action: BindingAction::Delegate {
				configurator_id: configurator_id.into(),
			},
			configuration: ConfigNode::new("configurator"),
		}
	}

	/// Projects a `pluginExecution` element.
	///
	/// Fails fast: a `configurator` action without a non-blank `id` child
	/// is rejected here, before any registry lookup can be attempted. A
	/// missing filter projects to the catch-all filter.
	pub fn from_config(node: &ConfigNode) -> Result<Self, MappingError> {
		let filter = match node.child("pluginExecutionFilter") {
			Some(element) => ExecutionFilter::from_config(element)?,
			None => ExecutionFilter::match_all(),
		};
		let Some(action) = node.child("action") else {
			return Err(MappingError::AmbiguousAction);
		};
		if let Some(ignore) = action.child("ignore") {
			return Ok(Self {
				filter,
				action: BindingAction::Ignore,
				configuration: ignore.clone(),
			});
		}
		if let Some(execute) = action.child("execute") {
			return Ok(Self {
				filter,
				action: BindingAction::Execute,
				configuration: execute.clone(),
			});
		}
		if let Some(configurator) = action.child("configurator") {
			let Some(id) = configurator.child_text("id") else {
				return Err(MappingError::malformed("a configurator id must be specified"));
			};
			return Ok(Self {
				filter,
				action: BindingAction::Delegate {
					configurator_id: id.to_string(),
				},
				configuration: configurator.clone(),
			});
		}
		Err(MappingError::AmbiguousAction)
	}

	/// Whether an execute-action binding re-runs on incremental builds.
	///
	/// Read from the `runOnIncremental` configuration child; defaults on.
	pub fn run_on_incremental(&self) -> bool {
		self.configuration
			.child_text("runOnIncremental")
			.map(|text| text.eq_ignore_ascii_case("true"))
			.unwrap_or(true)
	}
}

/// A lifecycle mapping: how projects of a packaging type are processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDef {
	pub id: String,
	/// Human-readable display name; may be empty.
	#[serde(default)]
	pub name: String,
	/// Packaging type this mapping governs. Registry-registered mappings
	/// looked up by id alone may leave this unset.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packaging_type: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub bindings: Vec<ExecutionBinding>,
}

impl MappingDef {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: String::new(),
			packaging_type: None,
			bindings: Vec::new(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_packaging_type(mut self, packaging_type: impl Into<String>) -> Self {
		self.packaging_type = Some(packaging_type.into());
		self
	}

	pub fn with_binding(mut self, binding: ExecutionBinding) -> Self {
		self.bindings.push(binding);
		self
	}

	/// Projects a `lifecycleMapping` element of a metadata document.
	///
	/// Declared mappings must carry both an id and a packaging type.
	pub fn from_config(node: &ConfigNode) -> Result<Self, MappingError> {
		let Some(id) = node.child_text("id") else {
			return Err(MappingError::malformed("a lifecycle mapping id must be specified"));
		};
		let Some(packaging_type) = node.child_text("packagingType") else {
			return Err(MappingError::malformed(format!(
				"lifecycle mapping '{id}' declares no packaging type"
			)));
		};
		let bindings = match node.child("pluginExecutions") {
			Some(executions) => executions
				.children_named("pluginExecution")
				.map(ExecutionBinding::from_config)
				.collect::<Result<_, _>>()?,
			None => Vec::new(),
		};
		Ok(Self {
			id: id.to_string(),
			name: node.child_text("name").unwrap_or_default().to_string(),
			packaging_type: Some(packaging_type.to_string()),
			bindings,
		})
	}
}

/// A named, versioned bundle of mapping and binding declarations.
///
/// The identity key for override purposes is `(group_id, artifact_id)`;
/// version is deliberately not part of the key, so re-declaring a source
/// replaces the earlier declaration whatever the versions involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
	pub group_id: String,
	pub artifact_id: String,
	pub version: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub mappings: Vec<MappingDef>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub executions: Vec<ExecutionBinding>,
}

impl MetadataSource {
	pub fn new(
		group_id: impl Into<String>,
		artifact_id: impl Into<String>,
		version: impl Into<String>,
	) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
			version: version.into(),
			mappings: Vec::new(),
			executions: Vec::new(),
		}
	}

	pub fn with_mapping(mut self, mapping: MappingDef) -> Self {
		self.mappings.push(mapping);
		self
	}

	pub fn with_execution(mut self, binding: ExecutionBinding) -> Self {
		self.executions.push(binding);
		self
	}

	/// Override identity key.
	pub fn key(&self) -> (&str, &str) {
		(&self.group_id, &self.artifact_id)
	}

	/// Projects a `lifecycleMappingMetadata` document root. The coordinates
	/// come from the artifact reference, not from the document.
	pub fn from_config(
		group_id: impl Into<String>,
		artifact_id: impl Into<String>,
		version: impl Into<String>,
		root: &ConfigNode,
	) -> Result<Self, MappingError> {
		let mappings = match root.child("lifecycleMappings") {
			Some(mappings) => mappings
				.children_named("lifecycleMapping")
				.map(MappingDef::from_config)
				.collect::<Result<_, _>>()?,
			None => Vec::new(),
		};
		let executions = match root.child("pluginExecutions") {
			Some(executions) => executions
				.children_named("pluginExecution")
				.map(ExecutionBinding::from_config)
				.collect::<Result<_, _>>()?,
			None => Vec::new(),
		};
		Ok(Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
			version: version.into(),
			mappings,
			executions,
		})
	}
}
