//! Field policies: auto-population and always-disabled lookup tables.
//!
//! The runtime SDK fills some schema paths on its own. Which paths, and
//! when, is configuration data rather than engine logic, so the tables are
//! injected into the form-state factory. Paths are dot-delimited and mirror
//! schema nesting with array indices omitted (`web.webPageDetails.URL`).

use serde::{Deserialize, Serialize};

/// When, if ever, the SDK supplies a field's value on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoPopulationSource {
    /// The SDK always writes this field; user input is never consulted.
    Always,
    /// Populated when the send command provides it, unless the user set one.
    OnCommand,
    /// Populated from automatic context collection, unless the user set one.
    OnContext,
    /// Never auto-populated.
    #[default]
    None,
}

impl AutoPopulationSource {
    /// Whether any auto-population applies.
    pub fn is_auto_populated(self) -> bool {
        self != AutoPopulationSource::None
    }
}

/// Injected path tables consulted while building form state.
#[derive(Debug, Clone, Default)]
pub struct FieldPolicies {
    auto_populated: Vec<(String, AutoPopulationSource)>,
    always_disabled: Vec<String>,
}

impl FieldPolicies {
    /// Policies with no auto-populated and no disabled paths.
    pub fn empty() -> Self {
        FieldPolicies::default()
    }

    /// The standard XDM field tables.
    pub fn xdm_defaults() -> Self {
        use AutoPopulationSource::*;
        FieldPolicies {
            auto_populated: [
                ("_id", Always),
                ("timestamp", Always),
                ("implementationDetails", Always),
                ("eventType", OnCommand),
                ("eventMergeId", OnCommand),
                ("environment", OnContext),
                ("device", OnContext),
                ("placeContext", OnContext),
                ("web", OnContext),
            ]
            .into_iter()
            .map(|(path, source)| (path.to_string(), source))
            .collect(),
            always_disabled: vec!["_id".to_string()],
        }
    }

    /// Build policies from explicit tables, mainly for tests.
    pub fn new(
        auto_populated: Vec<(String, AutoPopulationSource)>,
        always_disabled: Vec<String>,
    ) -> Self {
        FieldPolicies {
            auto_populated,
            always_disabled,
        }
    }

    /// Auto-population classification for an index-stripped dot path.
    pub fn auto_population(&self, path: &str) -> AutoPopulationSource {
        self.auto_populated
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, source)| *source)
            .unwrap_or(AutoPopulationSource::None)
    }

    /// Whether the path may never be edited.
    pub fn is_always_disabled(&self, path: &str) -> bool {
        self.always_disabled.iter().any(|p| p == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mark_id_always_populated_and_disabled() {
        let policies = FieldPolicies::xdm_defaults();
        assert_eq!(policies.auto_population("_id"), AutoPopulationSource::Always);
        assert!(policies.is_always_disabled("_id"));
        assert!(!policies.is_always_disabled("timestamp"));
    }

    #[test]
    fn lookup_is_exact_path_match() {
        let policies = FieldPolicies::xdm_defaults();
        assert_eq!(
            policies.auto_population("web"),
            AutoPopulationSource::OnContext
        );
        // Descendants are not implicitly auto-populated.
        assert_eq!(
            policies.auto_population("web.webPageDetails"),
            AutoPopulationSource::None
        );
    }

    #[test]
    fn empty_policies_classify_nothing() {
        let policies = FieldPolicies::empty();
        assert_eq!(
            policies.auto_population("timestamp"),
            AutoPopulationSource::None
        );
        assert!(!policies.is_always_disabled("_id"));
    }
}
