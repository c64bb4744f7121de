use super::Config;
use crate::error::ToolPrepError;
use config::Config as ConfigBuilder;

/// Prefix of the environment variables overriding the configuration file,
/// e.g. `TOOLPREP_INSTALL_ROOT` or `TOOLPREP_DOWNLOAD__PARALLELISM`.
pub const ENV_PREFIX: &str = "TOOLPREP";

pub fn load_config(config_path: Option<&str>) -> Result<Config, ToolPrepError> {
    build_config(config_path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(config_path: Option<&str>, environment: config::Environment) -> Result<Config, ToolPrepError> {
    let mut builder = ConfigBuilder::builder();
    if let Some(config_path) = config_path {
        tracing::debug!("Loading configuration from {}", config_path);
        builder = builder.add_source(config::File::with_name(config_path));
    }
    let config_builder = builder.add_source(environment).build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::time::Duration;

    fn fake_environment(vars: &[(&str, &str)]) -> config::Environment {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(vars))
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = build_config(None, fake_environment(&[])).unwrap();
        assert!(config.install_dependencies);
        assert_eq!(config.download.parallelism, 8);
        assert_eq!(config.download.request_timeout_secs, None);
        assert!(config.install_root.ends_with("toolprep"));
        assert!(config.launcher_dir.ends_with("applications"));
    }

    #[test]
    fn test_file_is_layered_under_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolprep.yaml");
        std::fs::write(
            &path,
            "install_root: /opt/tools\ninstall_dependencies: false\ndownload:\n  parallelism: 2\n  request_timeout_secs: 30\n",
        )
        .unwrap();

        let config = build_config(
            path.to_str(),
            fake_environment(&[("TOOLPREP_INSTALL_ROOT", "/srv/tools")]),
        )
        .unwrap();

        assert_eq!(config.install_root, Path::new("/srv/tools"));
        assert!(!config.install_dependencies);
        assert_eq!(config.download.parallelism, 2);
        assert_eq!(config.download.options().request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_nested_environment_override() {
        let config = build_config(None, fake_environment(&[("TOOLPREP_DOWNLOAD__PARALLELISM", "3")])).unwrap();
        assert_eq!(config.download.parallelism, 3);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolprep.toml");
        std::fs::write(&path, "install_rot = \"/opt\"\n").unwrap();

        let err = build_config(path.to_str(), fake_environment(&[])).unwrap_err();
        assert!(matches!(err, ToolPrepError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = build_config(Some("/nonexistent/toolprep.yaml"), fake_environment(&[])).unwrap_err();
        assert!(matches!(err, ToolPrepError::Config(_)));
    }
}
