/// Configuration system for homeval.
///
/// Layered hierarchy, later layers override earlier ones key by key:
///
/// 1. **Built-in defaults**: [`schema::HomevalConfig::default()`]
/// 2. **User global config**: `~/.homeval/config.toml`
/// 3. **Project local config**: `.homeval.toml` in the current directory
/// 4. **Environment variables**: `HOMEVAL_*` overrides
///
/// A file only overrides the keys it actually contains. Malformed files are
/// skipped with a warning on stderr rather than aborting the command.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

pub use schema::HomevalConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> HomevalConfig {
    let mut layers = Vec::new();
    if let Some(global) = load_toml_file(global_config_path()) {
        layers.push(global);
    }
    if let Some(project) = load_toml_file(project_config_path()) {
        layers.push(project);
    }

    let mut config = resolve_layers(&layers);
    apply_env_overrides(&mut config);
    config
}

/// Merge file layers over the built-in defaults.
///
/// Falls back to defaults if the merged tree no longer deserializes (a
/// layer set a key to the wrong type).
fn resolve_layers(layers: &[toml::Value]) -> HomevalConfig {
    let Ok(mut merged) = toml::Value::try_from(HomevalConfig::default()) else {
        return HomevalConfig::default();
    };
    for layer in layers {
        merge_values(&mut merged, layer);
    }
    match merged.try_into() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} ignoring config files: {e}", "warning:".yellow().bold());
            HomevalConfig::default()
        }
    }
}

/// Load a TOML file as an untyped tree so that absent keys stay absent.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!(
                "{} skipping malformed config {}: {e}",
                "warning:".yellow().bold(),
                path.display()
            );
            None
        }
    }
}

/// Recursively overlay `overlay` onto `base`. Tables merge; any other value
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.homeval/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".homeval").join("config.toml"))
}

/// Path to the project local config: `.homeval.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".homeval.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Some(rest) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            dirs::home_dir().map(|home| home.join(rest))
        }
        None => Some(Path::new(path).to_path_buf()),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `HOMEVAL_API_URL`: backend base URL
/// - `HOMEVAL_TIMEOUT_MS`: per-call timeout
/// - `HOMEVAL_REVEAL_DELAY_MS`: minimum pause before a result is shown
/// - `HOMEVAL_LOG`: request logging on/off
fn apply_env_overrides(config: &mut HomevalConfig) {
    if let Ok(val) = std::env::var("HOMEVAL_API_URL")
        && !val.trim().is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("HOMEVAL_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("HOMEVAL_REVEAL_DELAY_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.predictor.reveal_delay_ms = ms;
    }
    if let Ok(val) = std::env::var("HOMEVAL_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.homeval/config.toml`.
///
/// Fails if the file already exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.homeval/ directory")?;
    }

    fs::write(&path, HomevalConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `api.base_url`) in the global config file.
///
/// The existing file is overlaid on the defaults first, so any known key can
/// be set even if the file does not mention it yet. The result must still deserialize as a [`HomevalConfig`].
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root = toml::Value::try_from(HomevalConfig::default())
        .context("failed to serialize default config")?;
    if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        let existing: toml::Value =
            toml::from_str(&content).context("failed to parse config as TOML value")?;
        merge_values(&mut root, &existing);
    }

    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<HomevalConfig>()
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML tree using a dotted key path, parsing the raw
/// string according to the type of the value it replaces.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected number for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' cannot be set from the command line"),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
