//! Project configurator resolution.
//!
//! Decides which configurator runs for a concrete mojo execution: project
//! metadata first, front to back, first matching binding wins; then the
//! registry's configurators by their pre-bound filters. No match anywhere
//! is the legitimate "unmanaged" outcome, reported as `None`.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use mojomap_metadata::{
	BindingAction, ExecutionBinding, ExecutionFilter, ExecutionKey, MappingError,
};

use crate::registry::{CapabilityRegistry, ProjectConfigurator};
use crate::sources::MetadataSourceList;

/// Behavior of a resolved configurator.
///
/// A tagged variant, not a behavior hierarchy: each carries exactly the
/// data its behavior needs.
pub enum ConfiguratorAction {
	/// Do nothing for the matched executions.
	Ignore,
	/// Run the mojo; `run_on_incremental` controls whether it re-runs on
	/// incremental builds.
	Execute { run_on_incremental: bool },
	/// A host-provided implementation.
	Custom(Arc<dyn ProjectConfigurator>),
}

impl fmt::Debug for ConfiguratorAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ignore => f.write_str("Ignore"),
			Self::Execute { run_on_incremental } => f
				.debug_struct("Execute")
				.field("run_on_incremental", run_on_incremental)
				.finish(),
			Self::Custom(handle) => f.debug_tuple("Custom").field(&handle.id()).finish(),
		}
	}
}

/// A configurator materialized for a project, together with the filter
/// rules that scope it.
///
/// Even an ignore configurator keeps its originating filter, so "why was
/// this execution ignored" stays answerable.
#[derive(Debug)]
pub struct Configurator {
	pub action: ConfiguratorAction,
	pub filters: Vec<ExecutionFilter>,
}

impl Configurator {
	/// True when any attached filter matches `execution`.
	pub fn enabled_for(&self, execution: &ExecutionKey) -> bool {
		self.filters.iter().any(|filter| filter.matches(execution))
	}

	pub fn is_ignore(&self) -> bool {
		matches!(self.action, ConfiguratorAction::Ignore)
	}
}

/// Per-resolution-call state: one instantiation per configurator id, and
/// the delegation chain used to reject self-referential delegates.
#[derive(Default)]
pub(crate) struct Instantiations {
	handles: FxHashMap<String, Arc<dyn ProjectConfigurator>>,
	chain: FxHashSet<String>,
}

pub struct ConfiguratorResolver<'r> {
	registry: &'r dyn CapabilityRegistry,
}

impl<'r> ConfiguratorResolver<'r> {
	pub fn new(registry: &'r dyn CapabilityRegistry) -> Self {
		Self { registry }
	}

	/// Resolves the configurator for `execution`.
	///
	/// Project sources are consulted front to back, each binding in its
	/// declared order; the first binding whose filter matches decides. If
	/// no project binding matches, the registry's configurators are
	/// scanned by their pre-bound filters instead.
	pub fn for_execution(
		&self,
		sources: &MetadataSourceList,
		execution: &ExecutionKey,
	) -> Result<Option<Configurator>, MappingError> {
		for source in sources.iter() {
			for binding in &source.executions {
				if binding.filter.matches(execution) {
					debug!(
						"execution {execution} matched by metadata source {}:{}",
						source.group_id, source.artifact_id
					);
					return self
						.materialize(binding, &mut Instantiations::default())
						.map(Some);
				}
			}
		}
		self.fallback(execution)
	}

	/// Looks up a configurator by id alone, attaching its pre-bound
	/// filters. An unknown id is `None`; the caller decides whether
	/// absence is an error.
	pub fn by_id(&self, id: &str) -> Result<Option<Configurator>, MappingError> {
		let id = id.trim();
		if id.is_empty() {
			return Err(MappingError::malformed("a configurator id must be specified"));
		}
		let Some(entry) = self.registry.configurator_entry(id) else {
			return Ok(None);
		};
		let handle = self.instantiate(id)?;
		Ok(Some(Configurator {
			action: ConfiguratorAction::Custom(handle),
			filters: entry.prebound_filters,
		}))
	}

	fn fallback(&self, execution: &ExecutionKey) -> Result<Option<Configurator>, MappingError> {
		for entry in self.registry.configurator_entries() {
			if entry.prebound_filters.iter().any(|f| f.matches(execution)) {
				debug!(
					"execution {execution} handled by registry configurator '{}'",
					entry.id
				);
				let handle = self.instantiate(&entry.id)?;
				return Ok(Some(Configurator {
					action: ConfiguratorAction::Custom(handle),
					filters: entry.prebound_filters,
				}));
			}
		}
		debug!("execution {execution} has no configurator; leaving it unmanaged");
		Ok(None)
	}

	/// Builds the configurator a matched binding asks for.
	pub(crate) fn materialize(
		&self,
		binding: &ExecutionBinding,
		instantiations: &mut Instantiations,
	) -> Result<Configurator, MappingError> {
		match &binding.action {
			BindingAction::Ignore => Ok(Configurator {
				action: ConfiguratorAction::Ignore,
				filters: vec![binding.filter.clone()],
			}),
			BindingAction::Execute => Ok(Configurator {
				action: ConfiguratorAction::Execute {
					run_on_incremental: binding.run_on_incremental(),
				},
				filters: vec![binding.filter.clone()],
			}),
			BindingAction::Delegate { configurator_id } => {
				self.delegate(configurator_id, &binding.filter, instantiations)
			}
		}
	}

	fn delegate(
		&self,
		id: &str,
		filter: &ExecutionFilter,
		instantiations: &mut Instantiations,
	) -> Result<Configurator, MappingError> {
		// Blank ids are rejected before the registry is ever consulted.
		let id = id.trim();
		if id.is_empty() {
			return Err(MappingError::malformed("a configurator id must be specified"));
		}
		if !instantiations.chain.insert(id.to_string()) {
			return Err(MappingError::malformed(format!(
				"delegation cycle: configurator '{id}' re-enters its own resolution"
			)));
		}
		let result = self.delegate_to(id, filter, instantiations);
		instantiations.chain.remove(id);
		result
	}

	fn delegate_to(
		&self,
		id: &str,
		filter: &ExecutionFilter,
		instantiations: &mut Instantiations,
	) -> Result<Configurator, MappingError> {
		let Some(entry) = self.registry.configurator_entry(id) else {
			return Err(MappingError::NotInstalled { id: id.to_string() });
		};
		let handle = match instantiations.handles.get(id) {
			Some(handle) => handle.clone(),
			None => {
				let handle = self.instantiate(id)?;
				instantiations.handles.insert(id.to_string(), handle.clone());
				handle
			}
		};
		// The project-declared filter scopes the delegate on top of its
		// pre-bound rules.
		let mut filters = entry.prebound_filters;
		filters.push(filter.clone());
		Ok(Configurator {
			action: ConfiguratorAction::Custom(handle),
			filters,
		})
	}

	fn instantiate(&self, id: &str) -> Result<Arc<dyn ProjectConfigurator>, MappingError> {
		self.registry
			.instantiate(id)
			.ok_or_else(|| MappingError::NotInstalled { id: id.to_string() })
	}
}
