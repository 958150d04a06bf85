//! The ordered catalog of analysis steps.
//!
//! The catalog defines the canonical step order used by the composer and
//! the sequencer. It is built once at startup and passed down by
//! reference — never ambient state.

use serde::Deserialize;

/// A single analysis step: wire key, display label, icon glyph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepSpec {
    /// Key under which the analysis payload reports this step.
    pub key: String,
    /// Human-readable label shown in the step panel.
    pub label: String,
    /// Icon glyph prefixed to the label.
    pub icon: String,
}

impl StepSpec {
    fn new(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Fixed ordered list of analysis steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepCatalog {
    steps: Vec<StepSpec>,
}

impl StepCatalog {
    /// Build a catalog from an explicit step list.
    pub fn new(steps: Vec<StepSpec>) -> Self {
        Self { steps }
    }

    /// Number of steps in the catalog. Always ≥ 1 for the default catalog.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at the given position in canonical order.
    pub fn get(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    /// Look up a step by its wire key.
    pub fn find(&self, key: &str) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.key == key)
    }

    /// Iterate the steps in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &StepSpec> {
        self.steps.iter()
    }
}

impl Default for StepCatalog {
    /// The production catalog, in the order steps are revealed.
    fn default() -> Self {
        Self::new(vec![
            StepSpec::new("bundles", "Bundle Detection", "🎯"),
            StepSpec::new("devHistory", "Developer History", "👤"),
            StepSpec::new("topHolders", "Top Holders Analysis", "👥"),
            StepSpec::new("chart", "Chart Pattern Analysis", "📈"),
            StepSpec::new("freshWallets", "Fresh Wallet Activity", "✨"),
            StepSpec::new("devSold", "Developer Activity", "⚡"),
            StepSpec::new("lore", "Lore & Narrative", "📖"),
            StepSpec::new("socials", "Social Media Presence", "🌐"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eight_ordered_steps() {
        let catalog = StepCatalog::default();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(0).unwrap().key, "bundles");
        assert_eq!(catalog.get(7).unwrap().key, "socials");
    }

    #[test]
    fn find_by_key() {
        let catalog = StepCatalog::default();
        let step = catalog.find("chart").unwrap();
        assert_eq!(step.label, "Chart Pattern Analysis");
        assert_eq!(step.icon, "📈");
        assert!(catalog.find("nonexistent").is_none());
    }

    #[test]
    fn iteration_preserves_order() {
        let catalog = StepCatalog::default();
        let keys: Vec<&str> = catalog.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "bundles",
                "devHistory",
                "topHolders",
                "chart",
                "freshWallets",
                "devSold",
                "lore",
                "socials"
            ]
        );
    }
}
