use std::env;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_MODEL_PATH: &str = "crop_pest_model.safetensors";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration for the serving process, read from the environment
/// (with `.env` support) at startup.
///
/// One configurable service replaces what used to be separate development
/// and deployment entry points; the whole surface is the listen port, the
/// artifact path, the upload ceiling and the accepted file extensions.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub model_path: String,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match get("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let model_path = get("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "MAX_UPLOAD_BYTES",
                value,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let raw_extensions =
            get("ALLOWED_EXTENSIONS").unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string());
        let allowed_extensions: Vec<String> = raw_extensions
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                var: "ALLOWED_EXTENSIONS",
                value: raw_extensions,
            });
        }

        Ok(Self {
            port,
            model_path,
            max_upload_bytes,
            allowed_extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |var| {
            vars.iter()
                .find(|(name, _)| *name == var)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 10000);
        assert_eq!(config.model_path, "crop_pest_model.safetensors");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.allowed_extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn environment_overrides_are_honored() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("MODEL_PATH", "models/pests.safetensors"),
            ("MAX_UPLOAD_BYTES", "1048576"),
            ("ALLOWED_EXTENSIONS", " PNG, .jpeg "),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.model_path, "models/pests.safetensors");
        assert_eq!(config.max_upload_bytes, 1048576);
        assert_eq!(config.allowed_extensions, vec!["png", "jpeg"]);
    }

    #[test]
    fn unparseable_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "not-a-port")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("MAX_UPLOAD_BYTES", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ALLOWED_EXTENSIONS", " , ")])).is_err());
    }
}
