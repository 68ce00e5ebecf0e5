//! Plugin versions and version-range specs.
//!
//! Filters can constrain the plugin version of an execution with a range
//! spec: `[1.0,2.0)` half-open, `[1.0]` exact, `(,1.5]` unbounded below,
//! or a comma-joined list of such restrictions. A spec without brackets is
//! a "soft" requirement and places no constraint at all.
//!
//! Ranges are parsed once, at projection time, so that containment checks
//! during filter matching are infallible.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Parsed `major[.minor[.incremental]][-qualifier|-buildNumber]` version.
///
/// Parsing is total: a string that does not fit the shape is kept whole as
/// a qualifier, which orders below every numeric version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
	major: u64,
	minor: u64,
	incremental: u64,
	build: u64,
	qualifier: Option<String>,
}

impl Version {
	pub fn parse(text: &str) -> Self {
		let text = text.trim();
		let (dotted, suffix) = match text.split_once('-') {
			Some((head, tail)) => (head, Some(tail)),
			None => (text, None),
		};

		let mut numbers = [0u64; 3];
		let mut count = 0;
		for part in dotted.split('.') {
			if count == numbers.len() {
				return Self::qualifier_only(text);
			}
			match part.parse::<u64>() {
				Ok(n) => {
					numbers[count] = n;
					count += 1;
				}
				Err(_) => return Self::qualifier_only(text),
			}
		}

		let mut version = Self {
			major: numbers[0],
			minor: numbers[1],
			incremental: numbers[2],
			..Self::default()
		};
		if let Some(suffix) = suffix {
			match suffix.parse::<u64>() {
				Ok(n) => version.build = n,
				Err(_) => version.qualifier = Some(suffix.to_string()),
			}
		}
		version
	}

	fn qualifier_only(text: &str) -> Self {
		Self {
			qualifier: Some(text.to_string()),
			..Self::default()
		}
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.major, self.minor, self.incremental)
			.cmp(&(other.major, other.minor, other.incremental))
			.then_with(|| match (&self.qualifier, &other.qualifier) {
				(None, None) => self.build.cmp(&other.build),
				(Some(a), Some(b)) => a.cmp(b).then_with(|| self.build.cmp(&other.build)),
				// A qualified version precedes its release: 1.0-alpha < 1.0.
				(Some(_), None) => Ordering::Less,
				(None, Some(_)) => Ordering::Greater,
			})
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// One bracketed restriction of a range spec.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Restriction {
	lower: Option<Version>,
	lower_inclusive: bool,
	upper: Option<Version>,
	upper_inclusive: bool,
}

impl Restriction {
	fn contains(&self, version: &Version) -> bool {
		if let Some(lower) = &self.lower {
			match version.cmp(lower) {
				Ordering::Less => return false,
				Ordering::Equal if !self.lower_inclusive => return false,
				_ => {}
			}
		}
		if let Some(upper) = &self.upper {
			match version.cmp(upper) {
				Ordering::Greater => return false,
				Ordering::Equal if !self.upper_inclusive => return false,
				_ => {}
			}
		}
		true
	}
}

/// A pre-parsed version-range spec.
///
/// An empty restriction list means the spec was a soft requirement, which
/// admits every version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
	spec: String,
	restrictions: Vec<Restriction>,
}

impl VersionRange {
	pub fn parse(spec: &str) -> Result<Self, MappingError> {
		let text = spec.trim();
		if text.is_empty() {
			return Err(MappingError::malformed("empty version range"));
		}
		if !text.starts_with(['[', '(']) {
			return Ok(Self {
				spec: text.to_string(),
				restrictions: Vec::new(),
			});
		}

		let mut restrictions = Vec::new();
		let mut rest = text;
		loop {
			let open = match rest.as_bytes()[0] {
				b'[' => '[',
				b'(' => '(',
				_ => {
					return Err(MappingError::malformed(format!(
						"version range `{text}`: expected `[` or `(`"
					)));
				}
			};
			let Some(close_at) = rest.find([']', ')']) else {
				return Err(MappingError::malformed(format!(
					"version range `{text}`: unterminated restriction"
				)));
			};
			let close = rest.as_bytes()[close_at] as char;
			restrictions.push(Self::restriction(text, open, &rest[1..close_at], close)?);

			rest = &rest[close_at + 1..];
			if rest.is_empty() {
				break;
			}
			rest = rest.strip_prefix(',').ok_or_else(|| {
				MappingError::malformed(format!(
					"version range `{text}`: expected `,` between restrictions"
				))
			})?;
			if rest.is_empty() {
				return Err(MappingError::malformed(format!(
					"version range `{text}`: trailing `,`"
				)));
			}
		}

		Ok(Self {
			spec: text.to_string(),
			restrictions,
		})
	}

	fn restriction(
		spec: &str,
		open: char,
		body: &str,
		close: char,
	) -> Result<Restriction, MappingError> {
		let lower_inclusive = open == '[';
		let upper_inclusive = close == ']';

		let Some((low, high)) = body.split_once(',') else {
			// Single version, `[1.0]`.
			if body.trim().is_empty() {
				return Err(MappingError::malformed(format!(
					"version range `{spec}`: empty restriction"
				)));
			}
			if !lower_inclusive || !upper_inclusive {
				return Err(MappingError::malformed(format!(
					"version range `{spec}`: a single version must use `[..]`"
				)));
			}
			let exact = Version::parse(body);
			return Ok(Restriction {
				lower: Some(exact.clone()),
				lower_inclusive: true,
				upper: Some(exact),
				upper_inclusive: true,
			});
		};

		let lower = match low.trim() {
			"" => None,
			bound => Some(Version::parse(bound)),
		};
		let upper = match high.trim() {
			"" => None,
			bound => Some(Version::parse(bound)),
		};
		if let (Some(lower), Some(upper)) = (&lower, &upper)
			&& lower > upper
		{
			return Err(MappingError::malformed(format!(
				"version range `{spec}`: lower bound is above the upper bound"
			)));
		}
		Ok(Restriction {
			lower,
			lower_inclusive,
			upper,
			upper_inclusive,
		})
	}

	/// True when `version` is admitted by this range.
	pub fn matches(&self, version: &Version) -> bool {
		self.restrictions.is_empty() || self.restrictions.iter().any(|r| r.contains(version))
	}

	pub fn as_str(&self) -> &str {
		&self.spec
	}
}

impl fmt::Display for VersionRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.spec)
	}
}

impl TryFrom<String> for VersionRange {
	type Error = MappingError;

	fn try_from(spec: String) -> Result<Self, Self::Error> {
		Self::parse(&spec)
	}
}

impl From<VersionRange> for String {
	fn from(range: VersionRange) -> Self {
		range.spec
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn version_ordering() {
		let v = Version::parse;
		assert!(v("1.0") < v("1.1"));
		assert!(v("1.0") < v("2.0"));
		assert!(v("1.2.2") < v("1.2.10"));
		assert!(v("1.0-alpha") < v("1.0"));
		assert!(v("1.0-alpha") < v("1.0-beta"));
		assert!(v("1.0") < v("1.0-1"));
		assert_eq!(v("1.0"), v("1.0.0"));
	}

	#[test]
	fn unparsable_version_is_a_bare_qualifier() {
		assert!(Version::parse("not.a.version") < Version::parse("0.1"));
		assert_eq!(Version::parse("weird"), Version::parse(" weird "));
	}

	#[test]
	fn soft_spec_admits_everything() {
		let range = VersionRange::parse("2.3").unwrap();
		assert!(range.matches(&Version::parse("0.1")));
		assert!(range.matches(&Version::parse("99.0")));
		assert!(range.matches(&Version::parse("garbage")));
	}

	#[test]
	fn half_open_range() {
		let range = VersionRange::parse("[1.0,2.0)").unwrap();
		assert!(range.matches(&Version::parse("1.0")));
		assert!(range.matches(&Version::parse("1.5")));
		assert!(!range.matches(&Version::parse("2.0")));
		assert!(!range.matches(&Version::parse("0.9")));
	}

	#[test]
	fn unbounded_ranges() {
		let below = VersionRange::parse("(,1.5]").unwrap();
		assert!(below.matches(&Version::parse("0.1")));
		assert!(below.matches(&Version::parse("1.5")));
		assert!(!below.matches(&Version::parse("1.5.1")));

		let above = VersionRange::parse("[3.0,)").unwrap();
		assert!(above.matches(&Version::parse("3.0")));
		assert!(above.matches(&Version::parse("99.1")));
		assert!(!above.matches(&Version::parse("2.9")));
	}

	#[test]
	fn exact_range() {
		let range = VersionRange::parse("[1.0]").unwrap();
		assert!(range.matches(&Version::parse("1.0")));
		assert!(range.matches(&Version::parse("1.0.0")));
		assert!(!range.matches(&Version::parse("1.0.1")));
	}

	#[test]
	fn disjoint_restrictions() {
		let range = VersionRange::parse("(,1.0],[1.2,)").unwrap();
		assert!(range.matches(&Version::parse("0.5")));
		assert!(range.matches(&Version::parse("1.0")));
		assert!(!range.matches(&Version::parse("1.1")));
		assert!(range.matches(&Version::parse("1.5")));
	}

	#[test]
	fn malformed_specs_are_rejected() {
		for spec in ["", "[1.0", "(1.0)", "[2.0,1.0]", "[1.0,2.0)x", "[1.0,2.0),", "[]"] {
			assert!(
				matches!(VersionRange::parse(spec), Err(MappingError::Malformed(_))),
				"spec `{spec}` should be rejected"
			);
		}
	}
}
