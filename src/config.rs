//! Engine configuration loaded from `gomoku.toml`.
//!
//! Settings are resolved with the following priority (highest to lowest):
//! 1. Environment variables (`GOMOKU_<SECTION>_<KEY>`)
//! 2. The config file (`$GOMOKU_CONFIG`, else `./gomoku.toml`)
//! 3. Built-in defaults
//!
//! ```text
//! [alphabeta]
//! threads = 4
//! max_depth = 6
//! heuristic = "shapes"
//!
//! [mcts]
//! threads = 8
//! exploration = 1.4142
//! max_playouts = 200000
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{GomokuError, Result};
use crate::eval::Heuristic;

/// Locations searched for the config file when `GOMOKU_CONFIG` is unset
pub const CONFIG_SEARCH_PATHS: &[&str] = &["gomoku.toml", "../gomoku.toml"];

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8))
        .unwrap_or(4)
}

/// Alpha-beta engine settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlphaBetaConfig {
    /// Worker threads; worker k starts deepening at depth 1 + k
    pub threads: usize,
    /// Deepest pass to run; `None` deepens until stopped
    pub max_depth: Option<u32>,
    /// Evaluator registered by [`crate::AlphaBetaEngine::from_config`]
    pub heuristic: Heuristic,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            max_depth: None,
            heuristic: Heuristic::default(),
        }
    }
}

/// MCTS engine settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    pub threads: usize,
    /// UCT exploration constant `C`
    pub exploration: f64,
    /// Accesses between best-child recomputations
    pub refresh_interval: u64,
    /// Total playouts across all workers; `None` runs until stopped
    pub max_playouts: Option<u64>,
    /// Seed for per-worker rollout RNGs; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            exploration: std::f64::consts::SQRT_2,
            refresh_interval: 64,
            max_playouts: None,
            seed: None,
        }
    }
}

/// Settings for the self-play binary
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Time each engine gets per move
    pub think_ms: u64,
    /// Plies after which the game is abandoned
    pub max_plies: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            think_ms: 500,
            max_plies: 225,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub alphabeta: AlphaBetaConfig,
    pub mcts: MctsConfig,
    pub demo: DemoConfig,
}

impl EngineConfig {
    /// Parse a TOML document; missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GomokuError::Config(e.to_string()))
    }
}

/// Load the configuration, falling back to defaults on any file problem.
///
/// Searches `GOMOKU_CONFIG` first, then [`CONFIG_SEARCH_PATHS`]. Environment
/// overrides are applied last.
pub fn load_config() -> EngineConfig {
    if let Ok(path) = std::env::var("GOMOKU_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from GOMOKU_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!("GOMOKU_CONFIG={} not found, searching defaults", path.display());
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No gomoku.toml found, using built-in defaults");
    apply_env_overrides(EngineConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> EngineConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match EngineConfig::from_toml_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(EngineConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(EngineConfig::default())
        }
    }
}

macro_rules! env_override {
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Some(v) = std::env::var($key).ok().and_then(|s| s.parse().ok()) {
            debug!(key = $key, "config override from environment");
            $config.$section.$field = v;
        }
    };
    ($config:expr, $section:ident . $field:ident, $key:expr, optional) => {
        if let Some(v) = std::env::var($key).ok().and_then(|s| s.parse().ok()) {
            debug!(key = $key, "config override from environment");
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply `GOMOKU_<SECTION>_<KEY>` overrides; unparsable values are ignored.
pub fn apply_env_overrides(mut config: EngineConfig) -> EngineConfig {
    env_override!(config, alphabeta.threads, "GOMOKU_ALPHABETA_THREADS");
    env_override!(config, alphabeta.max_depth, "GOMOKU_ALPHABETA_MAX_DEPTH", optional);
    env_override!(config, alphabeta.heuristic, "GOMOKU_ALPHABETA_HEURISTIC");

    env_override!(config, mcts.threads, "GOMOKU_MCTS_THREADS");
    env_override!(config, mcts.exploration, "GOMOKU_MCTS_EXPLORATION");
    env_override!(config, mcts.refresh_interval, "GOMOKU_MCTS_REFRESH_INTERVAL");
    env_override!(config, mcts.max_playouts, "GOMOKU_MCTS_MAX_PLAYOUTS", optional);
    env_override!(config, mcts.seed, "GOMOKU_MCTS_SEED", optional);

    env_override!(config, demo.think_ms, "GOMOKU_DEMO_THINK_MS");
    env_override!(config, demo.max_plies, "GOMOKU_DEMO_MAX_PLIES");

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.alphabeta.threads >= 1);
        assert_eq!(config.alphabeta.max_depth, None);
        assert_eq!(config.alphabeta.heuristic, Heuristic::Shapes);
        assert!((config.mcts.exploration - std::f64::consts::SQRT_2).abs() < f64::EPSILON);
        assert_eq!(config.mcts.refresh_interval, 64);
        assert_eq!(config.mcts.max_playouts, None);
        assert_eq!(config.demo.think_ms, 500);
    }

    #[test]
    fn test_parse_config_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
[alphabeta]
threads = 2
max_depth = 4
heuristic = "segments"

[mcts]
exploration = 0.7
seed = 42
"#,
        )
        .unwrap();
        assert_eq!(config.alphabeta.threads, 2);
        assert_eq!(config.alphabeta.max_depth, Some(4));
        assert_eq!(config.alphabeta.heuristic, Heuristic::Segments);
        assert!((config.mcts.exploration - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.mcts.seed, Some(42));
        assert_eq!(config.mcts.refresh_interval, 64); // Default
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("[alphabeta]\nthreads = \"many\"").unwrap_err();
        assert!(matches!(err, GomokuError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_path_uses_defaults() {
        let config = load_from_path(Path::new("/nonexistent/gomoku.toml"));
        assert_eq!(config.mcts.refresh_interval, 64);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("GOMOKU_MCTS_MAX_PLAYOUTS", "1234");
        std::env::set_var("GOMOKU_ALPHABETA_HEURISTIC", "runs");
        std::env::set_var("GOMOKU_DEMO_THINK_MS", "not-a-number");

        let config = apply_env_overrides(EngineConfig::default());
        assert_eq!(config.mcts.max_playouts, Some(1234));
        assert_eq!(config.alphabeta.heuristic, Heuristic::Runs);
        assert_eq!(config.demo.think_ms, 500);

        std::env::remove_var("GOMOKU_MCTS_MAX_PLAYOUTS");
        std::env::remove_var("GOMOKU_ALPHABETA_HEURISTIC");
        std::env::remove_var("GOMOKU_DEMO_THINK_MS");
    }
}
