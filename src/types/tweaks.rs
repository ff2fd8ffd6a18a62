//! Per-component overrides forwarded to the flow as `tweaks`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Component id → override fields.
///
/// Component ids are opaque strings chosen by whoever built the flow
/// (e.g. `"ChatInput-HdACw"`); no schema is assumed for either level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tweaks(BTreeMap<String, Map<String, Value>>);

impl Tweaks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of objects, e.g. `{"OpenAI-XXXXX": {"model_name": "gpt-4"}}`.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Set the override fields for one component, replacing any previous entry.
    pub fn with_component(
        mut self,
        component: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        self.insert(component, fields);
        self
    }

    pub fn insert(&mut self, component: impl Into<String>, fields: Map<String, Value>) {
        self.0.insert(component.into(), fields);
    }

    pub fn get(&self, component: &str) -> Option<&Map<String, Value>> {
        self.0.get(component)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Layer `self` over `base`. Entries are replaced whole, per component id.
    pub fn merged_over(&self, base: &Tweaks) -> Tweaks {
        let mut merged = base.0.clone();
        for (component, fields) in &self.0 {
            merged.insert(component.clone(), fields.clone());
        }
        Tweaks(merged)
    }
}

impl FromIterator<(String, Map<String, Value>)> for Tweaks {
    fn from_iter<I: IntoIterator<Item = (String, Map<String, Value>)>>(iter: I) -> Self {
        Tweaks(iter.into_iter().collect())
    }
}
