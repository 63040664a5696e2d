use std::fs;
use std::path::{Path, PathBuf};

use minehint_core::MergePolicy;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ExperienceStore, FileStorage};

pub const ENV_EXPERIENCE_PATH: &str = "MINEHINT_EXPERIENCE_PATH";
pub const ENV_SEED: &str = "MINEHINT_SEED";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvisorConfig {
    /// Where learned experience is kept.
    pub experience_path: PathBuf,
    /// Seed for the random fallbacks; OS entropy when unset.
    pub seed: Option<u64>,
    pub merge_policy: MergePolicy,
    /// Save after every reported outcome. Off for dry runs.
    pub persist: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            experience_path: PathBuf::from("ai_experience.json"),
            seed: None,
            merge_policy: MergePolicy::default(),
            persist: true,
        }
    }
}

impl AdvisorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Overrides fields from `MINEHINT_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = var(ENV_EXPERIENCE_PATH).filter(|path| !path.is_empty()) {
            self.experience_path = PathBuf::from(path);
        }
        if let Some(value) = var(ENV_SEED) {
            let seed = value.trim().parse().map_err(|_| ConfigError::Env {
                key: ENV_SEED,
                value,
            })?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    pub fn open_store(&self) -> ExperienceStore<FileStorage> {
        ExperienceStore::load(FileStorage::new(&self.experience_path))
            .with_merge_policy(self.merge_policy)
    }

    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = AdvisorConfig::from_toml_str("seed = 9").unwrap();

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.experience_path, PathBuf::from("ai_experience.json"));
        assert_eq!(config.merge_policy, MergePolicy::Overwrite);
        assert!(config.persist);
    }

    #[test]
    fn toml_selects_merge_policy() {
        let text = "experience_path = \"data/exp.json\"\nmerge_policy = \"max\"\npersist = false\n";
        let config = AdvisorConfig::from_toml_str(text).unwrap();

        assert_eq!(config.experience_path, PathBuf::from("data/exp.json"));
        assert_eq!(config.merge_policy, MergePolicy::Max);
        assert!(!config.persist);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            AdvisorConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AdvisorConfig::default();
        config
            .apply_vars(|key| match key {
                ENV_EXPERIENCE_PATH => Some("elsewhere.json".to_owned()),
                ENV_SEED => Some(" 17 ".to_owned()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.experience_path, PathBuf::from("elsewhere.json"));
        assert_eq!(config.seed, Some(17));
    }

    #[test]
    fn bad_seed_names_the_variable() {
        let mut config = AdvisorConfig::default();
        let err = config
            .apply_vars(|key| (key == ENV_SEED).then(|| "soon".to_owned()))
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid value \"soon\" for MINEHINT_SEED");
    }
}
