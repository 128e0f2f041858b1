use std::path::Path;

use anyhow::Context;

/// Naming of the documents the comment manager provisions
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Name of the hidden folder comments are stored in, per top-level area
    pub container_name: String,

    /// Base name of comment documents, suffixed by the repository on collision
    pub comment_name: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            container_name: String::from("Comments"),
            comment_name: String::from("comment"),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Config> {
        let config: Config = serde_json::from_str(json).context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {:?}", path))?;
        Config::from_json(&json).with_context(|| format!("loading configuration file {:?}", path))
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (field, name) in [
            ("container_name", &self.container_name),
            ("comment_name", &self.comment_name),
        ] {
            anyhow::ensure!(
                !name.is_empty() && !name.contains('/'),
                "{field} must be a non-empty document name without slashes, got {name:?}"
            );
        }
        Ok(())
    }
}
