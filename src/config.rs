use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resolver::LinkResolver;

const CONFIG_FILE: &str = "config.yaml";

/// Project configuration, read from `.linkitem/config.yaml`.
///
/// Each setting registers a hook on the [`LinkResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkItemConfig {
    /// Appended to every non-empty resolved link, e.g. "?ref=cms"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_suffix: Option<String>,
    /// Replacement labels for link types, keyed by tag
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub type_labels: BTreeMap<String, String>,
    /// Link type tags to leave out of the menu
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hidden_types: Vec<String>,
}

impl LinkItemConfig {
    /// Load the config from a project directory, or defaults if there is none
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    /// Register this config's hooks on a resolver
    pub fn apply(&self, resolver: &mut LinkResolver) {
        if let Some(suffix) = self.link_suffix.clone() {
            resolver.on_link(move |_, link| {
                if !link.is_empty() {
                    link.push_str(&suffix);
                }
            });
        }

        if !self.type_labels.is_empty() || !self.hidden_types.is_empty() {
            let labels = self.type_labels.clone();
            let hidden = self.hidden_types.clone();
            resolver.on_link_types(move |types| {
                for (tag, label) in &labels {
                    if types.get(tag).is_some() {
                        types.insert(tag.clone(), label.clone());
                    }
                }
                for tag in &hidden {
                    types.remove(tag);
                }
            });
        }
    }

    /// A resolver with this config's hooks registered
    pub fn resolver(&self) -> LinkResolver {
        let mut resolver = LinkResolver::new();
        self.apply(&mut resolver);
        resolver
    }
}
