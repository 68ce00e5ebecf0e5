//! Untyped configuration trees.
//!
//! Metadata documents and plugin configuration reach this crate already
//! parsed into a tree of named elements; the document parser itself is a
//! host collaborator. [`ConfigNode`] is that tree: element name, optional
//! text value, ordered children.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<ConfigNode>,
}

impl ConfigNode {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: None,
			children: Vec::new(),
		}
	}

	/// Convenience for `<name>value</name>` leaf elements.
	pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::new(name).with_value(value)
	}

	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	pub fn with_child(mut self, child: ConfigNode) -> Self {
		self.children.push(child);
		self
	}

	/// First child with the given element name.
	pub fn child(&self, name: &str) -> Option<&ConfigNode> {
		self.children.iter().find(|c| c.name == name)
	}

	/// All children with the given element name, in declared order.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
		self.children.iter().filter(move |c| c.name == name)
	}

	/// Trimmed text value; `None` when absent or blank.
	pub fn text(&self) -> Option<&str> {
		match self.value.as_deref().map(str::trim) {
			None | Some("") => None,
			some => some,
		}
	}

	/// Trimmed text value of the first child with the given name.
	pub fn child_text(&self, name: &str) -> Option<&str> {
		self.child(name).and_then(ConfigNode::text)
	}
}
