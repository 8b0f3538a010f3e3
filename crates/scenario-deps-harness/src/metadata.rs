//! Scenario metadata exposed to lifecycle hooks.

/// Strip the optional leading `@` used when tags are written Gherkin style.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::normalise_tag;
///
/// assert_eq!(normalise_tag("@smoke"), "smoke");
/// assert_eq!(normalise_tag("smoke"), "smoke");
/// ```
#[must_use]
pub fn normalise_tag(tag: &str) -> &str {
    tag.strip_prefix('@').unwrap_or(tag)
}

/// Identity, tags and example arguments for one scenario run.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::ScenarioMetadata;
///
/// let metadata = ScenarioMetadata::new(
///     "Calculator",
///     "Add two numbers",
///     vec!["@dependency".to_string()],
///     Vec::new(),
/// );
/// assert_eq!(metadata.group_title(), "Calculator");
/// assert_eq!(metadata.scenario_title(), "Add two numbers");
/// assert!(metadata.has_tag("dependency"));
/// assert!(!metadata.is_parameterized());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioMetadata {
    group_title: String,
    scenario_title: String,
    tags: Vec<String>,
    arguments: Vec<(String, String)>,
}

impl ScenarioMetadata {
    /// Creates metadata for one scenario run.
    #[must_use]
    pub fn new(
        group_title: impl Into<String>,
        scenario_title: impl Into<String>,
        tags: Vec<String>,
        arguments: Vec<(String, String)>,
    ) -> Self {
        Self {
            group_title: group_title.into(),
            scenario_title: scenario_title.into(),
            tags,
            arguments,
        }
    }

    /// Returns the title of the enclosing group.
    #[must_use]
    pub fn group_title(&self) -> &str {
        &self.group_title
    }

    /// Returns the scenario title.
    #[must_use]
    pub fn scenario_title(&self) -> &str {
        &self.scenario_title
    }

    /// Returns the scenario tags followed by the group tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the example row bound to this run, empty for plain scenarios.
    #[must_use]
    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    /// Looks up one example argument by column name.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` when this run is an expansion of an outline.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Returns `true` when any tag matches `tag`, ignoring a leading `@`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalise_tag(tag);
        self.tags.iter().any(|candidate| normalise_tag(candidate) == wanted)
    }
}

impl Default for ScenarioMetadata {
    fn default() -> Self {
        Self::new("<unknown>", "<unknown>", Vec::new(), Vec::new())
    }
}
