//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use truthpulse_core::export::ExportFormat;

/// Top-level truthpulse configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthpulseConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the record document and the exports.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Spreadsheet export served by `GET /api/analytics.xlsx`.
    #[serde(default = "default_export_file")]
    pub export_file: String,
    /// Also keep a CSV mirror, served by `GET /api/analytics.csv`.
    #[serde(default = "default_true")]
    pub csv_export: bool,
    #[serde(default = "default_csv_export_file")]
    pub csv_export_file: String,
    /// Quiz catalog TOML; the built-in catalog is used when unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Reject responses that carry no contact email.
    #[serde(default = "default_true")]
    pub require_contact: bool,
    /// Route `GET /api/seed`.
    #[serde(default)]
    pub enable_seed: bool,
    /// Maximum accepted request body size.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./truthpulse-data")
}
fn default_database_file() -> String {
    "db.json".to_string()
}
fn default_export_file() -> String {
    "analytics.xlsx".to_string()
}
fn default_csv_export_file() -> String {
    "analytics.csv".to_string()
}
fn default_true() -> bool {
    true
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for TruthpulseConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            export_file: default_export_file(),
            csv_export: true,
            csv_export_file: default_csv_export_file(),
            catalog: None,
            require_contact: true,
            enable_seed: false,
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl TruthpulseConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// Where the export of `format` lives, whether or not it is enabled.
    pub fn export_path(&self, format: ExportFormat) -> PathBuf {
        match format {
            ExportFormat::Xlsx => self.data_dir.join(&self.export_file),
            ExportFormat::Csv => self.data_dir.join(&self.csv_export_file),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.bind, self.port))
    }
}

/// Sample configuration written by `truthpulse init`.
pub const SAMPLE_CONFIG: &str = r#"# truthpulse configuration
bind = "127.0.0.1"
port = 3000
data_dir = "./truthpulse-data"
database_file = "db.json"
export_file = "analytics.xlsx"
csv_export = true
csv_export_file = "analytics.csv"
# catalog = "catalog.toml"
require_contact = true
enable_seed = false
body_limit_bytes = 1048576
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `truthpulse.toml` in the current directory
/// 2. `~/.config/truthpulse/config.toml`
///
/// Environment variable overrides: `PORT`, `TRUTHPULSE_PORT`, `TRUTHPULSE_DATA_DIR`.
pub fn load_config() -> Result<TruthpulseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TruthpulseConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("truthpulse.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content, path)?
        }
        None => TruthpulseConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    resolve_config_paths(&mut config);

    tracing::debug!(
        source = ?config_path,
        port = config.port,
        data_dir = %config.data_dir.display(),
        "loaded configuration"
    );
    Ok(config)
}

/// Parse a configuration TOML string.
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<TruthpulseConfig> {
    toml::from_str::<TruthpulseConfig>(content)
        .with_context(|| format!("failed to parse config: {}", source_path.display()))
}

/// Apply environment overrides. `TRUTHPULSE_PORT` wins over `PORT`.
pub fn apply_env_overrides<F>(config: &mut TruthpulseConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    for key in ["PORT", "TRUTHPULSE_PORT"] {
        if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
            config.port = value
                .trim()
                .parse()
                .with_context(|| format!("invalid {key} value: {value}"))?;
        }
    }
    if let Some(dir) = lookup("TRUTHPULSE_DATA_DIR").filter(|v| !v.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn resolve_config_paths(config: &mut TruthpulseConfig) {
    config.data_dir = resolve_path(&config.data_dir);
    config.database_file = resolve_env_vars(&config.database_file);
    config.export_file = resolve_env_vars(&config.export_file);
    config.csv_export_file = resolve_env_vars(&config.csv_export_file);
    config.catalog = config.catalog.as_deref().map(resolve_path);
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("truthpulse"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TRUTHPULSE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TRUTHPULSE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_TRUTHPULSE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${OOPS"), "unterminated ${OOPS");
        std::env::remove_var("_TRUTHPULSE_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_TRUTHPULSE_SELF_REF", "${_TRUTHPULSE_SELF_REF}");
        std::env::set_var("_TRUTHPULSE_NESTED", "${HOME}/data");
        assert_eq!(
            resolve_env_vars("${_TRUTHPULSE_SELF_REF}"),
            "${_TRUTHPULSE_SELF_REF}"
        );
        assert_eq!(
            resolve_env_vars("/srv/${_TRUTHPULSE_NESTED}/x"),
            "/srv/${HOME}/data/x"
        );
        assert_eq!(resolve_env_vars("${_TRUTHPULSE_UNSET_VAR}a${}b"), "ab");
        std::env::remove_var("_TRUTHPULSE_SELF_REF");
        std::env::remove_var("_TRUTHPULSE_NESTED");
    }

    #[test]
    fn default_config() {
        let config = TruthpulseConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path(), PathBuf::from("./truthpulse-data/db.json"));
        assert_eq!(
            config.export_path(ExportFormat::Xlsx),
            PathBuf::from("./truthpulse-data/analytics.xlsx")
        );
        assert_eq!(
            config.export_path(ExportFormat::Csv),
            PathBuf::from("./truthpulse-data/analytics.csv")
        );
        assert!(config.csv_export);
        assert!(config.require_contact);
        assert!(!config.enable_seed);
        assert_eq!(config.body_limit_bytes, 1_048_576);
    }

    #[test]
    fn sample_config_parses_to_defaults() {
        let config = parse_config_str(SAMPLE_CONFIG, Path::new("truthpulse.toml")).unwrap();
        assert_eq!(config, TruthpulseConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config_str(
            "port = 8080\nenable_seed = true\ncatalog = \"quiz.toml\"\n",
            Path::new("truthpulse.toml"),
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.enable_seed);
        assert_eq!(config.catalog, Some(PathBuf::from("quiz.toml")));
        assert_eq!(config.bind, "127.0.0.1");
    }

    #[test]
    fn bad_config_names_the_file() {
        let err = parse_config_str("port = \"high\"", Path::new("broken.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn env_overrides_apply_in_order() {
        let env: HashMap<&str, &str> = [
            ("PORT", "4000"),
            ("TRUTHPULSE_PORT", "5000"),
            ("TRUTHPULSE_DATA_DIR", "/srv/truthpulse"),
        ]
        .into_iter()
        .collect();
        let mut config = TruthpulseConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/truthpulse"));

        let mut config = TruthpulseConfig::default();
        apply_env_overrides(&mut config, |k| (k == "PORT").then(|| "4000".to_string())).unwrap();
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut config = TruthpulseConfig::default();
        let result =
            apply_env_overrides(&mut config, |k| (k == "PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_missing_path_errors() {
        assert!(load_config_from(Some(Path::new("/nonexistent/truthpulse.toml"))).is_err());
    }

    #[test]
    fn socket_addr_from_bind_and_port() {
        let config = TruthpulseConfig {
            bind: "0.0.0.0".into(),
            port: 8081,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().port(), 8081);
    }
}
