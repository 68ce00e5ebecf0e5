//! End-to-end resolution: declaration surface -> override list -> both
//! resolvers, with the registry as the fallback layer.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use mojomap_metadata::{ConfigNode, ExecutionFilter, ExecutionKey, MappingDef, MetadataSource};
use mojomap_resolver::{
	CapabilityRegistry, Configurator, ConfiguratorAction, ConfiguratorEntry, ConfiguratorResolver,
	MappingResolver, MetadataSourceList, ProjectConfigurator, SourceFailure, SourceRef,
	SourceResolver, StaticRegistry, source_refs,
};

struct Stub(&'static str);

impl ProjectConfigurator for Stub {
	fn id(&self) -> &str {
		self.0
	}
}

/// Parses declared references against a fixed table of metadata documents,
/// standing in for artifact resolution plus document parsing.
struct DocumentTable(Vec<(SourceRef, ConfigNode)>);

impl SourceResolver for DocumentTable {
	fn resolve(&self, reference: &SourceRef) -> Result<MetadataSource, SourceFailure> {
		let (_, document) = self
			.0
			.iter()
			.find(|(known, _)| known == reference)
			.ok_or(SourceFailure::NotFound)?;
		MetadataSource::from_config(
			reference.group_id.clone(),
			reference.artifact_id.clone(),
			reference.version.clone(),
			document,
		)
		.map_err(|err| SourceFailure::Malformed(err.to_string()))
	}
}

fn source_element(group_id: &str, artifact_id: &str, version: &str) -> ConfigNode {
	ConfigNode::new("source")
		.with_child(ConfigNode::leaf("groupId", group_id))
		.with_child(ConfigNode::leaf("artifactId", artifact_id))
		.with_child(ConfigNode::leaf("version", version))
}

fn mapping_document(mapping_id: &str, packaging_type: &str) -> ConfigNode {
	ConfigNode::new("lifecycleMappingMetadata").with_child(
		ConfigNode::new("lifecycleMappings").with_child(
			ConfigNode::new("lifecycleMapping")
				.with_child(ConfigNode::leaf("id", mapping_id))
				.with_child(ConfigNode::leaf("packagingType", packaging_type)),
		),
	)
}

fn delegate_document(configurator_id: &str, goal: &str) -> ConfigNode {
	ConfigNode::new("lifecycleMappingMetadata").with_child(
		ConfigNode::new("pluginExecutions").with_child(
			ConfigNode::new("pluginExecution")
				.with_child(
					ConfigNode::new("pluginExecutionFilter").with_child(
						ConfigNode::new("goals").with_child(ConfigNode::leaf("goal", goal)),
					),
				)
				.with_child(
					ConfigNode::new("action").with_child(
						ConfigNode::new("configurator")
							.with_child(ConfigNode::leaf("id", configurator_id)),
					),
				),
		),
	)
}

fn registry() -> StaticRegistry {
	StaticRegistry::new()
		.with_mapping(MappingDef::new("jar.builtin").with_packaging_type("jar"))
		.with_configurator(
			ConfiguratorEntry::new("jdt")
				.with_filter(ExecutionFilter::match_all().with_group_id("org.x")),
			|| Arc::new(Stub("jdt")),
		)
}

#[test]
fn declared_sources_shadow_each_other_and_the_registry() {
	let plugin_config = ConfigNode::new("configuration").with_child(
		ConfigNode::new("lifecycleMappingMetadataSources")
			.with_child(source_element("g1", "a1", "1.0"))
			.with_child(source_element("g2", "a2", "1.0")),
	);
	let documents = DocumentTable(vec![
		(SourceRef::new("g1", "a1", "1.0"), mapping_document("war.first", "war")),
		(SourceRef::new("g2", "a2", "1.0"), mapping_document("war.second", "war")),
	]);

	let refs = source_refs(&plugin_config).unwrap();
	let sources = MetadataSourceList::build(&refs, &documents).unwrap();
	let registry = registry();
	let resolver = MappingResolver::new(&registry);

	// The later declaration wins; the registry only serves packaging
	// types no project source covers.
	assert_eq!(resolver.for_packaging(&sources, "war").unwrap().id, "war.second");
	assert_eq!(resolver.for_packaging(&sources, "jar").unwrap().id, "jar.builtin");
	assert!(resolver.for_packaging(&sources, "ear").is_none());
}

#[test]
fn redeclared_source_replaces_its_earlier_bindings() {
	let refs = [
		SourceRef::new("g1", "a1", "1.0"),
		SourceRef::new("g1", "a1", "2.0"),
	];
	let documents = DocumentTable(vec![
		(refs[0].clone(), mapping_document("war.v1", "war")),
		(refs[1].clone(), mapping_document("war.v2", "war")),
	]);

	let sources = MetadataSourceList::build(&refs, &documents).unwrap();
	assert_eq!(sources.len(), 1);

	let registry = registry();
	let resolver = MappingResolver::new(&registry);
	assert_eq!(resolver.for_packaging(&sources, "war").unwrap().id, "war.v2");
}

#[test]
fn project_delegate_scopes_a_registry_configurator() {
	let refs = [SourceRef::new("g1", "a1", "1.0")];
	let documents = DocumentTable(vec![(refs[0].clone(), delegate_document("jdt", "compile"))]);
	let sources = MetadataSourceList::build(&refs, &documents).unwrap();

	let registry = registry();
	let resolver = ConfiguratorResolver::new(&registry);
	let execution = ExecutionKey::new("org.x", "plugin", "1.2", "compile");

	let configurator: Configurator = resolver.for_execution(&sources, &execution).unwrap().unwrap();
	assert!(matches!(&configurator.action, ConfiguratorAction::Custom(c) if c.id() == "jdt"));
	// Pre-bound filter plus the project-declared scope.
	assert_eq!(configurator.filters.len(), 2);
	assert!(configurator.enabled_for(&execution));
}

#[test]
fn registry_serves_executions_no_source_mentions() {
	let registry = registry();
	let resolver = ConfiguratorResolver::new(&registry);
	let execution = ExecutionKey::new("org.x", "plugin", "1.2", "anything");

	let configurator = resolver
		.for_execution(&MetadataSourceList::empty(), &execution)
		.unwrap()
		.unwrap();
	assert!(matches!(&configurator.action, ConfiguratorAction::Custom(c) if c.id() == "jdt"));

	let foreign = ExecutionKey::new("org.elsewhere", "plugin", "1.2", "compile");
	assert!(resolver
		.for_execution(&MetadataSourceList::empty(), &foreign)
		.unwrap()
		.is_none());
}

#[test]
fn fully_built_mapping_resolves_its_delegates() {
	let registry = StaticRegistry::new()
		.with_mapping(
			MappingDef::new("war.custom")
				.with_packaging_type("war")
				.with_binding(mojomap_metadata::ExecutionBinding::delegate(
					ExecutionFilter::match_all().with_goal("compile"),
					"jdt",
				)),
		)
		.with_configurator(ConfiguratorEntry::new("jdt"), || Arc::new(Stub("jdt")));
	let resolver = MappingResolver::new(&registry);

	let mapping = resolver.by_id("war.custom").unwrap().unwrap();
	assert_eq!(mapping.packaging_type.as_deref(), Some("war"));
	assert_eq!(mapping.configurators.len(), 1);
	assert!(registry.mapping_def("war.custom").is_some());
}
