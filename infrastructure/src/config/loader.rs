//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_FILES: [&str; 2] = ["mana.toml", ".mana.toml"];

/// Prefix of environment overrides, e.g. `MANA_CHAT__MAX_SNIPPETS=3`.
const ENV_PREFIX: &str = "MANA_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `MANA_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./mana.toml` or `./.mana.toml`
    /// 4. Global: `~/.config/mana-chat/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().filter(|p| p.exists()),
            Self::project_config_path(),
            config_path.map(PathBuf::as_path),
        )
        .merge(Self::env())
        .extract()
        .map_err(Box::new)
    }

    /// Load defaults plus environment overrides (for --no-config)
    pub fn load_defaults() -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Self::env())
            .extract()
            .map_err(Box::new)
    }

    fn figment(global: Option<PathBuf>, project: Option<PathBuf>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/mana-chat/config.toml` (or the platform
    /// equivalent).
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mana-chat").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}<SECTION>__<KEY>", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./mana.toml or ./.mana.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_files() {
        let config: FileConfig = ConfigLoader::figment(None, None, None).extract().unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = write_toml(
            dir.path(),
            "global.toml",
            "[chat]\nmax_history_turns = 3\nmax_prompt_turns = 7\n",
        );
        let project = write_toml(dir.path(), "mana.toml", "[chat]\nmax_history_turns = 5\n");
        let explicit = write_toml(dir.path(), "explicit.toml", "[narration]\nenabled = false\n");

        let config: FileConfig =
            ConfigLoader::figment(Some(global), Some(project), Some(explicit.as_path()))
                .extract()
                .unwrap();

        assert_eq!(config.chat.max_history_turns, 5);
        assert_eq!(config.chat.max_prompt_turns, 7);
        assert!(!config.narration.enabled);
        assert_eq!(config.chat.max_snippets, 5);
    }

    #[test]
    fn test_nested_provider_keys_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_toml(
            dir.path(),
            "c.toml",
            "[providers.pinecone]\nindex = \"mana\"\n",
        );

        let config: FileConfig = ConfigLoader::figment(None, None, Some(path.as_path()))
            .extract()
            .unwrap();

        assert_eq!(config.providers.pinecone.index.as_deref(), Some("mana"));
        assert_eq!(config.providers.pinecone.api_key_env, "PINECONE_API_KEY");
    }

    #[test]
    fn test_invalid_type_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_toml(dir.path(), "bad.toml", "[chat]\nmax_snippets = \"five\"\n");

        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, None, Some(path.as_path())).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("mana-chat"));
    }
}
