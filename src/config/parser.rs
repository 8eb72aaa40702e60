use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads the crawler configuration from a TOML file
///
/// The file must carry the `[crawler]`, `[user-agent]`, `[output]` and
/// `[mirror]` sections; missing optional keys take their defaults and the
/// result is validated before it is returned.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use rumble_crawl::config::load_config;
///
/// let config = load_config(Path::new("rumble.toml")).unwrap();
/// println!("Request interval: {}ms", config.crawler.min_request_interval);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Hex SHA-256 of the configuration file as stored on disk
///
/// Every row in `runs` records this hash, so a stored crawl can be traced to
/// the exact settings (interval, limits, mirror) it ran with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Loads the configuration and the hash of the same bytes
///
/// The file is read once, so the recorded hash always describes the
/// configuration that was parsed.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    tracing::debug!(
        "Crawler config: interval {}ms, timeout {}s, max depth {:?}, max pages {:?}",
        config.crawler.min_request_interval,
        config.crawler.request_timeout,
        config.crawler.max_depth,
        config.crawler.max_pages
    );

    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[crawler]
min-request-interval = 500
request-timeout = 10
max-depth = 4

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./test.db"

[mirror]
directory = "./imgs"
public-base-url = "http://imgs.example.com"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.min_request_interval, 500);
        assert_eq!(config.crawler.request_timeout, 10);
        assert_eq!(config.crawler.max_depth, Some(4));
        assert_eq!(config.crawler.max_pages, None);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.mirror.public_base_url, "http://imgs.example.com");
    }

    #[test]
    fn test_crawler_defaults() {
        let content = VALID_CONFIG
            .replace("min-request-interval = 500\n", "")
            .replace("request-timeout = 10\n", "")
            .replace("max-depth = 4\n", "");
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.min_request_interval, 1000);
        assert_eq!(config.crawler.request_timeout, 30);
        assert_eq!(config.crawler.max_depth, None);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace("min-request-interval = 500", "min-request-interval = 10");
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_config_missing_mirror_section() {
        let content = VALID_CONFIG.split("[mirror]").next().unwrap().to_string();
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_hash_matches_loaded_config() {
        let file = create_temp_config(VALID_CONFIG);

        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.output.database_path, "./test.db");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }

    #[test]
    fn test_invalid_config_yields_no_hash() {
        let content = VALID_CONFIG.replace("request-timeout = 10", "request-timeout = 0");
        let file = create_temp_config(&content);

        assert!(matches!(
            load_config_with_hash(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
