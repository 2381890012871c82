use serde::{Deserialize, Serialize};

use super::catalog::Category;

/// Per-category on/off switches. Any change means a full rebuild of the graph;
/// hidden categories simply never get nodes, and edges to them fall away
/// because their endpoints are missing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFilter {
    pub companies: bool,
    pub persons: bool,
    pub shareholders: bool,
    pub addresses: bool,
    pub bankruptcies: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self { companies: true, persons: true, shareholders: true, addresses: true, bankruptcies: true }
    }
}

impl VisibilityFilter {
    pub fn is_visible(&self, category: Category) -> bool {
        match category {
            Category::Companies => self.companies,
            Category::Persons => self.persons,
            Category::Shareholders => self.shareholders,
            Category::Addresses => self.addresses,
            Category::Bankruptcies => self.bankruptcies,
        }
    }

    fn slot(&mut self, category: Category) -> &mut bool {
        match category {
            Category::Companies => &mut self.companies,
            Category::Persons => &mut self.persons,
            Category::Shareholders => &mut self.shareholders,
            Category::Addresses => &mut self.addresses,
            Category::Bankruptcies => &mut self.bankruptcies,
        }
    }

    /// Returns true when the switch actually changed (i.e. a rebuild is due).
    pub fn set(&mut self, category: Category, visible: bool) -> bool {
        let slot = self.slot(category);
        let changed = *slot != visible;
        *slot = visible;
        changed
    }

    pub fn toggle(&mut self, category: Category) {
        let slot = self.slot(category);
        *slot = !*slot;
    }
}
