use thiserror::Error;

/// Errors raised while projecting or resolving lifecycle-mapping metadata.
///
/// This type is shared between the metadata and resolver crates to avoid a
/// dependency cycle. Absence of a match is never an error: resolvers report
/// "no managed behavior" through `Ok(None)`, and every variant here carries
/// the offending identifier instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
	/// A declaration is structurally invalid: missing required field, blank
	/// configurator id, bad version-range grammar, delegation cycle.
	#[error("malformed lifecycle mapping metadata: {0}")]
	Malformed(String),
	/// A declared metadata source could not be fetched or parsed.
	#[error("cannot resolve lifecycle mapping metadata source {group_id}:{artifact_id}:{version}: {reason}")]
	UnresolvedSource {
		group_id: String,
		artifact_id: String,
		version: String,
		reason: String,
	},
	/// A referenced configurator id is well-formed but absent from the
	/// capability registry. Remediation is to install the missing piece,
	/// not to edit the declaration.
	#[error("project configurator '{id}' is not available; install it and refresh the project configuration")]
	NotInstalled { id: String },
	/// A binding's `action` element names none of the recognized actions.
	#[error("a plugin execution action must be specified")]
	AmbiguousAction,
}

impl MappingError {
	pub fn malformed(message: impl Into<String>) -> Self {
		Self::Malformed(message.into())
	}
}
