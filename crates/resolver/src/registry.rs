//! The global capability registry boundary.
//!
//! Hosts supply the built-in lifecycle mappings and configurators from
//! whatever discovery mechanism they have: extension points, a plugin
//! manager, or a static table. The resolvers only require deterministic
//! enumeration order, because every lookup contract is first-match-wins.

use std::sync::Arc;

use mojomap_metadata::{ExecutionFilter, MappingDef};

/// Handle to a host-instantiated configurator implementation.
///
/// The resolution engine never invokes behavior on it; it attaches filter
/// rules and hands it back to the build engine.
pub trait ProjectConfigurator: Send + Sync {
	fn id(&self) -> &str;
}

/// A registry-provided configurator: its id plus the filters the provider
/// pre-bound to it.
#[derive(Debug, Clone, Default)]
pub struct ConfiguratorEntry {
	pub id: String,
	pub prebound_filters: Vec<ExecutionFilter>,
}

impl ConfiguratorEntry {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			prebound_filters: Vec::new(),
		}
	}

	pub fn with_filter(mut self, filter: ExecutionFilter) -> Self {
		self.prebound_filters.push(filter);
		self
	}
}

/// Read-only lookup of built-in mappings and configurators.
///
/// Implementations must be safe for concurrent lookups and enumerate in a
/// deterministic order. Instantiation may block on host-side loading;
/// callers perform it at most once per id per resolution call, and no
/// cross-call caching is guaranteed.
pub trait CapabilityRegistry: Send + Sync {
	/// Built-in lifecycle mappings, in provider order.
	fn mapping_defs(&self) -> Vec<MappingDef>;

	/// Built-in configurators, in provider order.
	fn configurator_entries(&self) -> Vec<ConfiguratorEntry>;

	/// Instantiates the implementation behind a configurator entry;
	/// `None` when the id is not installed.
	fn instantiate(&self, id: &str) -> Option<Arc<dyn ProjectConfigurator>>;

	/// First built-in mapping declared for `packaging_type`.
	fn mapping_def_for_packaging(&self, packaging_type: &str) -> Option<MappingDef> {
		self.mapping_defs()
			.into_iter()
			.find(|def| def.packaging_type.as_deref() == Some(packaging_type))
	}

	/// Built-in mapping with the given id.
	fn mapping_def(&self, id: &str) -> Option<MappingDef> {
		self.mapping_defs().into_iter().find(|def| def.id == id)
	}

	/// Configurator entry with the given id.
	fn configurator_entry(&self, id: &str) -> Option<ConfiguratorEntry> {
		self.configurator_entries()
			.into_iter()
			.find(|entry| entry.id == id)
	}
}

type ConfiguratorFactory = Box<dyn Fn() -> Arc<dyn ProjectConfigurator> + Send + Sync>;

/// In-memory registry with registration-order enumeration.
///
/// Configurator implementations are built lazily through the registered
/// factory, one call per `instantiate`.
#[derive(Default)]
pub struct StaticRegistry {
	mappings: Vec<MappingDef>,
	configurators: Vec<(ConfiguratorEntry, ConfiguratorFactory)>,
}

impl StaticRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_mapping(mut self, def: MappingDef) -> Self {
		self.mappings.push(def);
		self
	}

	pub fn with_configurator<F>(mut self, entry: ConfiguratorEntry, factory: F) -> Self
	where
		F: Fn() -> Arc<dyn ProjectConfigurator> + Send + Sync + 'static,
	{
		self.configurators.push((entry, Box::new(factory)));
		self
	}
}

impl CapabilityRegistry for StaticRegistry {
	fn mapping_defs(&self) -> Vec<MappingDef> {
		self.mappings.clone()
	}

	fn configurator_entries(&self) -> Vec<ConfiguratorEntry> {
		self.configurators
			.iter()
			.map(|(entry, _)| entry.clone())
			.collect()
	}

	fn instantiate(&self, id: &str) -> Option<Arc<dyn ProjectConfigurator>> {
		self.configurators
			.iter()
			.find(|(entry, _)| entry.id == id)
			.map(|(_, factory)| factory())
	}
}
