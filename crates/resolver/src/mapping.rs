//! Lifecycle mapping resolution.
//!
//! Which mapping governs a project is decided by its packaging type:
//! project-declared metadata wins over the registry's built-in defaults.
//! A mapping selected by id is only "fully built" once every binding it
//! declares has been materialized into a concrete configurator.

use tracing::debug;

use mojomap_metadata::{MappingDef, MappingError};

use crate::configurator::{Configurator, ConfiguratorResolver, Instantiations};
use crate::registry::CapabilityRegistry;
use crate::sources::MetadataSourceList;

/// A lifecycle mapping with every binding materialized.
#[derive(Debug)]
pub struct ResolvedMapping {
	pub id: String,
	pub name: String,
	pub packaging_type: Option<String>,
	pub configurators: Vec<Configurator>,
}

pub struct MappingResolver<'r> {
	registry: &'r dyn CapabilityRegistry,
}

impl<'r> MappingResolver<'r> {
	pub fn new(registry: &'r dyn CapabilityRegistry) -> Self {
		Self { registry }
	}

	/// The mapping descriptor governing `packaging_type`.
	///
	/// Project sources are walked front to back, their mappings in
	/// declared order; the first whose packaging type matches wins. Only
	/// then is the registry consulted. `None` means no mapping governs
	/// this packaging type, which is a legitimate outcome, not an error.
	pub fn for_packaging(
		&self,
		sources: &MetadataSourceList,
		packaging_type: &str,
	) -> Option<MappingDef> {
		for source in sources.iter() {
			for mapping in &source.mappings {
				if mapping.packaging_type.as_deref() == Some(packaging_type) {
					debug!(
						"packaging type '{packaging_type}' mapped by metadata source {}:{}",
						source.group_id, source.artifact_id
					);
					return Some(mapping.clone());
				}
			}
		}
		debug!("packaging type '{packaging_type}' falls back to the registry");
		self.registry.mapping_def_for_packaging(packaging_type)
	}

	/// Builds the registry mapping with the given id. `Ok(None)` when the
	/// id is unknown to the registry.
	pub fn by_id(&self, id: &str) -> Result<Option<ResolvedMapping>, MappingError> {
		let id = id.trim();
		if id.is_empty() {
			return Err(MappingError::malformed("a lifecycle mapping id must be specified"));
		}
		let Some(def) = self.registry.mapping_def(id) else {
			return Ok(None);
		};
		self.build(def).map(Some)
	}

	/// Materializes every binding of `def` into a ready configurator.
	///
	/// Delegate targets are instantiated at most once per id for this
	/// build; an unresolvable target aborts the build with the error
	/// naming it.
	pub fn build(&self, def: MappingDef) -> Result<ResolvedMapping, MappingError> {
		let resolver = ConfiguratorResolver::new(self.registry);
		let mut instantiations = Instantiations::default();
		let mut configurators = Vec::with_capacity(def.bindings.len());
		for binding in &def.bindings {
			configurators.push(resolver.materialize(binding, &mut instantiations)?);
		}
		Ok(ResolvedMapping {
			id: def.id,
			name: def.name,
			packaging_type: def.packaging_type,
			configurators,
		})
	}
}
