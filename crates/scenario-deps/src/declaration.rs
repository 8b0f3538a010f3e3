//! Parsing of dependency tags.
//!
//! Scenarios declare what they depend on with `dependsOn:<name>` and become
//! legal dependency targets with `dependency`. Both tags may be written with
//! or without a leading `@` and may sit on the scenario or on its group.

use scenario_deps_harness::normalise_tag;

/// Prefix of the tag declaring a dependency.
pub const DEPENDS_ON_PREFIX: &str = "dependsOn:";

/// Tag marking a scenario as a legal dependency target.
pub const DEPENDENCY_TAG: &str = "dependency";

/// A parsed `dependsOn:<name>` tag.
///
/// # Examples
///
/// ```
/// use scenario_deps::DependencyDeclaration;
///
/// let declaration = DependencyDeclaration::parse("@dependsOn:AddTwoNumbers");
/// assert_eq!(declaration.as_ref().map(DependencyDeclaration::target), Some("AddTwoNumbers"));
/// assert!(DependencyDeclaration::parse("@dependency").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyDeclaration {
    target: String,
}

impl DependencyDeclaration {
    /// Parse a single tag. Returns `None` for other tags and for a
    /// declaration without a target name.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let target = normalise_tag(tag).strip_prefix(DEPENDS_ON_PREFIX)?.trim();
        if target.is_empty() {
            return None;
        }
        Some(Self {
            target: target.to_owned(),
        })
    }

    /// Find the declaration among a scenario's tags. The first declaration
    /// wins; later ones are reported and ignored.
    #[must_use]
    pub fn find<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        let mut declarations = tags.iter().filter_map(|tag| Self::parse(tag.as_ref()));
        let first = declarations.next()?;
        for ignored in declarations {
            log::warn!(
                "ignoring dependsOn:{}; the scenario already depends on {}",
                ignored.target,
                first.target
            );
        }
        Some(first)
    }

    /// Structural name of the scenario depended upon.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Returns `true` when `tags` contain the dependency marker.
#[must_use]
pub fn carries_marker<S: AsRef<str>>(tags: &[S]) -> bool {
    tags.iter()
        .any(|tag| normalise_tag(tag.as_ref()) == DEPENDENCY_TAG)
}
