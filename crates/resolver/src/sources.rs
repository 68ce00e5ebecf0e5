//! Project-declared metadata sources and the override list.
//!
//! A project opts into lifecycle-mapping overrides by declaring an ordered
//! list of metadata source artifacts in its build configuration. The list
//! built here is what gives project declarations their precedence: each
//! resolved source is prepended, evicting any earlier entry with the same
//! `(group_id, artifact_id)` key, and resolution walks the result front to
//! back. Later declarations therefore shadow earlier ones.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mojomap_metadata::{ConfigNode, MappingError, MetadataSource};

/// Reference to a metadata source artifact, as declared in the project
/// build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
	pub group_id: String,
	pub artifact_id: String,
	pub version: String,
}

impl SourceRef {
	pub fn new(
		group_id: impl Into<String>,
		artifact_id: impl Into<String>,
		version: impl Into<String>,
	) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
			version: version.into(),
		}
	}
}

impl fmt::Display for SourceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
	}
}

/// Why a source reference could not be turned into a [`MetadataSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
	#[error("artifact not found")]
	NotFound,
	#[error("repository error: {0}")]
	Repository(String),
	#[error("I/O error: {0}")]
	Io(String),
	#[error("malformed metadata document: {0}")]
	Malformed(String),
}

/// Artifact fetch and document parse boundary.
///
/// Implementations resolve the metadata artifact behind a reference and
/// parse it into a [`MetadataSource`]; both steps may block on network or
/// disk.
pub trait SourceResolver {
	fn resolve(&self, reference: &SourceRef) -> Result<MetadataSource, SourceFailure>;
}

/// Projects the ordered source references out of the well-known plugin
/// configuration element.
///
/// An absent `lifecycleMappingMetadataSources` section yields an empty
/// list (registry-only resolution). A `source` element missing one of its
/// coordinates is a malformed declaration.
pub fn source_refs(plugin_config: &ConfigNode) -> Result<Vec<SourceRef>, MappingError> {
	let Some(sources) = plugin_config.child("lifecycleMappingMetadataSources") else {
		return Ok(Vec::new());
	};
	sources
		.children_named("source")
		.map(|source| {
			let coordinate = |name: &str| {
				source.child_text(name).map(str::to_string).ok_or_else(|| {
					MappingError::malformed(format!("metadata source declares no {name}"))
				})
			};
			Ok(SourceRef {
				group_id: coordinate("groupId")?,
				artifact_id: coordinate("artifactId")?,
				version: coordinate("version")?,
			})
		})
		.collect()
}

/// Priority-ordered metadata sources with replace-on-conflict semantics.
///
/// Invariant: at most one entry per `(group_id, artifact_id)` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSourceList {
	sources: Vec<MetadataSource>,
}

impl MetadataSourceList {
	/// Empty list; resolution falls through to the registry alone.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Resolves `refs` in declared order. A reference that fails to
	/// resolve is a hard misconfiguration, not something to skip: the
	/// caller gets an error naming the offending coordinates.
	pub fn build(refs: &[SourceRef], resolver: &dyn SourceResolver) -> Result<Self, MappingError> {
		let mut list = Self::empty();
		for reference in refs {
			let source =
				resolver
					.resolve(reference)
					.map_err(|failure| MappingError::UnresolvedSource {
						group_id: reference.group_id.clone(),
						artifact_id: reference.artifact_id.clone(),
						version: reference.version.clone(),
						reason: failure.to_string(),
					})?;
			list.declare(source);
		}
		Ok(list)
	}

	/// Collects already-resolved sources with the same override semantics
	/// as [`build`](Self::build).
	pub fn from_declared(sources: impl IntoIterator<Item = MetadataSource>) -> Self {
		let mut list = Self::empty();
		for source in sources {
			list.declare(source);
		}
		list
	}

	fn declare(&mut self, source: MetadataSource) {
		// Remove-then-prepend, not a sort: this is what decides which of
		// two same-key declarations wins.
		self.sources.retain(|existing| existing.key() != source.key());
		debug!(
			"metadata source {}:{}:{} declared",
			source.group_id, source.artifact_id, source.version
		);
		self.sources.insert(0, source);
	}

	/// Sources in resolution priority order, highest first.
	pub fn iter(&self) -> impl Iterator<Item = &MetadataSource> {
		self.sources.iter()
	}

	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}
}
