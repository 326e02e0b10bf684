use super::Config;
use crate::error::RelFetchError;
use config::Config as ConfigBuilder;
use config::Environment;

/// Loads the configuration from an optional file overlaid with the process environment.
pub fn load_config(config_path: Option<&str>) -> Result<Config, RelFetchError> {
    load_config_with_environment(config_path, Environment::default())
}

pub fn load_config_with_environment(
    config_path: Option<&str>,
    environment: Environment,
) -> Result<Config, RelFetchError> {
    let mut builder = ConfigBuilder::builder();
    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path));
    }

    let app_config: Config = builder.add_source(environment).build()?.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn validate(app_config: &Config) -> Result<(), RelFetchError> {
    if app_config.access_token.is_empty() {
        return Err(missing("github_access_token"));
    }
    for (key, value) in [
        ("tag", &app_config.tag),
        ("source", &app_config.file_names),
        ("repository_url", &app_config.repository_url),
    ] {
        if value.trim().is_empty() {
            return Err(missing(key));
        }
    }
    if app_config.requested_file_names().is_empty() {
        return Err(RelFetchError::ConfigValidation {
            details: "source does not name any file".to_string(),
        });
    }
    Ok(())
}

fn missing(key: &str) -> RelFetchError {
    RelFetchError::ConfigValidation {
        details: format!("{key} is required and must not be empty"),
    }
}
