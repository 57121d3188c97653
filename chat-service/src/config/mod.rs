use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_MODEL_ID: &str = "reponseashimwe/healthcare-chatbot";
const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LOAD_MAX_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub model: ModelConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model identifier on the inference endpoint.
    pub model_id: String,
    /// Access token; sent as a bearer token when present.
    pub hf_token: Option<Secret<String>>,
    /// Base URL of the inference endpoint.
    pub inference_url: String,
    pub request_timeout_secs: u64,
    /// Warm-up attempts while the endpoint reports the model as loading.
    pub load_max_attempts: u32,
}

/// Which generation backend to wire in at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    HuggingFace,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown CHAT_PROVIDER '{}', expected 'huggingface' or 'mock'",
                other
            ))),
        }
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ChatConfig {
            common: common_config,
            provider: get_env("CHAT_PROVIDER", Some("huggingface"), is_prod)?.parse()?,
            model: ModelConfig {
                model_id: get_env("MODEL_ID", Some(DEFAULT_MODEL_ID), is_prod)?,
                hf_token: env::var("HF_TOKEN")
                    .ok()
                    .filter(|token| !token.trim().is_empty())
                    .map(Secret::new),
                inference_url: get_env("HF_INFERENCE_URL", Some(DEFAULT_INFERENCE_URL), is_prod)?,
                request_timeout_secs: parse_env(
                    "CHAT_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
                load_max_attempts: parse_env("MODEL_LOAD_MAX_ATTEMPTS", DEFAULT_LOAD_MAX_ATTEMPTS)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, val, e))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_known_names() {
        assert_eq!(
            "huggingface".parse::<ProviderKind>().unwrap(),
            ProviderKind::HuggingFace
        );
        assert_eq!(" HF ".parse::<ProviderKind>().unwrap(), ProviderKind::HuggingFace);
        assert_eq!("Mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
    }

    #[test]
    fn provider_kind_rejects_unknown_names() {
        assert!(matches!(
            "onnx".parse::<ProviderKind>(),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("CHAT_SERVICE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
