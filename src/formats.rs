use crate::engine::FormatRegistry;
use std::collections::BTreeMap;

/// Per-format toggle state for the output format checkboxes. Built once at
/// startup from the union of every target format the registry reports.
#[derive(Debug, Default, Clone)]
pub struct FormatSelection {
    toggles: BTreeMap<String, bool>,
}

impl FormatSelection {
    /// An empty or failing registry degrades to an empty selection; the UI
    /// shows "no formats available" instead of crashing.
    pub fn from_registry(registry: &dyn FormatRegistry) -> Self {
        let mut toggles = BTreeMap::new();
        for targets in registry.list_supported_formats().values() {
            for target in targets {
                toggles.entry(target.clone()).or_insert(false);
            }
        }

        if toggles.is_empty() {
            tracing::warn!("format registry reported no supported formats");
        }

        Self { toggles }
    }

    /// Names currently toggled on, in sorted order.
    pub fn selected(&self) -> Vec<String> {
        self.toggles
            .iter()
            .filter(|(_, &on)| on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn set(&mut self, format: &str, on: bool) {
        if let Some(toggle) = self.toggles.get_mut(format) {
            *toggle = on;
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut bool)> {
        self.toggles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }
}
