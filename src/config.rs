use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,
    /// MongoDB connection string
    pub mongo_uri: String,
    /// Database name
    pub database: String,
    /// Session lifetime in days
    pub session_days: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "recipe-app".to_string(),
            session_days: 7,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(port) = std::env::var("FORKFUL_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(uri) = std::env::var("FORKFUL_MONGO_URI") {
            config.mongo_uri = uri;
        }
        if let Ok(database) = std::env::var("FORKFUL_DATABASE") {
            config.database = database;
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/forkful/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("forkful")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, "recipe-app");
        assert_eq!(config.session_days, 7);
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "port: 9090").unwrap();
        writeln!(file, "mongo_uri: mongodb://db.internal:27017").unwrap();
        writeln!(file, "database: recipes-prod").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.mongo_uri, "mongodb://db.internal:27017");
        assert_eq!(config.database, "recipes-prod");
        // Unset fields keep their defaults
        assert_eq!(config.session_days, 7);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "port: [not a number").unwrap();

        assert!(Config::load(Some(config_path)).is_err());
    }
}
