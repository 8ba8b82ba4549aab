//! Configuration management for azprompt
//!
//! Settings come from three layers, lowest precedence first: an optional TOML
//! file, environment variables, and command-line flags (applied by `main`).
//! The access credential is only ever read from the environment.

use crate::error::{AppError, AppResult};
use crate::message::{ChatMessage, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT};
use crate::request::{ChatCompletionRequest, validate_request_fields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Deployment name used when `DEPLOYMENT_NAME` is unset
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
/// Output token cap used when none is configured
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Environment variable naming the deployment (shared by both profiles)
pub const DEPLOYMENT_VAR: &str = "DEPLOYMENT_NAME";
/// Environment variable overriding the API version (shared by both profiles)
pub const API_VERSION_VAR: &str = "AZURE_API_VERSION";

const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Endpoint flavour
///
/// `Inference` targets the model-inference API where the model is named in
/// the request body. `Openai` targets an Azure OpenAI deployment where the
/// deployment is part of the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Inference,
    Openai,
}

impl Profile {
    /// Environment variable holding the endpoint URL
    pub fn endpoint_var(self) -> &'static str {
        match self {
            Profile::Inference => "AZURE_INFERENCE_SDK_ENDPOINT",
            Profile::Openai => "AZURE_OPENAI_ENDPOINT",
        }
    }

    /// Environment variable holding the access key
    pub fn key_var(self) -> &'static str {
        match self {
            Profile::Inference => "AZURE_INFERENCE_SDK_KEY",
            Profile::Openai => "AZURE_OPENAI_KEY",
        }
    }

    pub fn default_api_version(self) -> &'static str {
        match self {
            Profile::Inference => "2024-05-01-preview",
            Profile::Openai => "2024-10-21",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Inference => f.write_str("inference"),
            Profile::Openai => f.write_str("openai"),
        }
    }
}

/// How the response is written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Response body exactly as received
    #[default]
    Raw,
    /// Indented response JSON
    Pretty,
    /// First choice content followed by token usage
    Summary,
}

/// Access key with redacted `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// `[endpoint]` section of the config file
///
/// Has no key field; a file that sets one fails to parse.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    pub url: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

/// Request options (`[request]` section)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_user_prompt() -> String {
    DEFAULT_USER_PROMPT.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            user_prompt: default_user_prompt(),
            max_tokens: default_max_tokens(),
            temperature: None,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }
}

impl RequestConfig {
    /// The ordered `[system, user]` conversation for this run
    pub fn messages(&self) -> Vec<ChatMessage> {
        crate::message::conversation(&self.system_prompt, &self.user_prompt)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_request_fields(
            &self.messages(),
            self.max_tokens,
            self.temperature,
            self.presence_penalty,
            self.frequency_penalty,
        )
    }

    /// Build the wire request; `model` is omitted from the body when `None`
    pub fn to_request(&self, model: Option<&str>) -> Result<ChatCompletionRequest, String> {
        let mut builder = ChatCompletionRequest::builder()
            .messages(self.messages())
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .presence_penalty(self.presence_penalty)
            .frequency_penalty(self.frequency_penalty);
        if let Some(model) = model {
            builder = builder.model(model);
        }
        builder.build()
    }
}

/// `[output]` section of the config file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Contents of the optional TOML config file
///
/// Every field is optional; an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub endpoint: EndpointSection,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl FromStr for FileConfig {
    type Err = AppError;

    /// Parse configuration from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Self =
            toml::from_str(content).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| AppError::ConfigValidationFailed {
                path: "<string>".to_string(),
                reason,
            })?;

        Ok(config)
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| AppError::ConfigValidationFailed {
                path: path_display,
                reason,
            })?;

        tracing::debug!(path = %path.as_ref().display(), "Loaded config file");
        Ok(config)
    }

    /// Log level for telemetry: the command-line value if given, else the file's
    pub fn log_level<'a>(&'a self, cli_override: Option<&'a str>) -> &'a str {
        cli_override.unwrap_or(&self.observability.log_level)
    }

    /// Validate the values present in the file
    ///
    /// Settings that may still be supplied by the environment are checked
    /// again after resolution.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.endpoint.url {
            validate_url(url)?;
        }
        if let Some(timeout) = self.endpoint.request_timeout_seconds {
            validate_timeout(timeout)?;
        }
        self.request.validate()
    }
}

fn validate_url(url: &str) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!(
            "endpoint url '{}' must start with 'http://' or 'https://'",
            url
        ));
    }
    Ok(())
}

fn validate_timeout(timeout: u64) -> Result<(), String> {
    if timeout == 0 {
        return Err("request_timeout_seconds must be greater than 0".to_string());
    }
    if timeout > MAX_TIMEOUT_SECONDS {
        return Err(format!(
            "request_timeout_seconds cannot exceed {} seconds, got {}",
            MAX_TIMEOUT_SECONDS, timeout
        ));
    }
    Ok(())
}

/// Resolved connection settings
///
/// Fields are private so a constructed value has always passed validation.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    profile: Profile,
    url: String,
    deployment: String,
    api_key: ApiKey,
    api_version: String,
    request_timeout_seconds: Option<u64>,
}

impl EndpointConfig {
    /// Create validated endpoint settings
    ///
    /// # Errors
    /// Returns `AppError::Config` for a non-HTTP URL, an empty deployment
    /// name, or a timeout outside `(0, 300]`.
    pub fn new(
        profile: Profile,
        url: impl Into<String>,
        deployment: impl Into<String>,
        api_key: ApiKey,
        api_version: impl Into<String>,
        request_timeout_seconds: Option<u64>,
    ) -> AppResult<Self> {
        let url = url.into();
        let deployment = deployment.into();

        validate_url(&url).map_err(AppError::Config)?;
        if deployment.trim().is_empty() {
            return Err(AppError::Config(
                "deployment name cannot be empty".to_string(),
            ));
        }
        if let Some(timeout) = request_timeout_seconds {
            validate_timeout(timeout).map_err(AppError::Config)?;
        }

        Ok(Self {
            profile,
            url,
            deployment,
            api_key,
            api_version: api_version.into(),
            request_timeout_seconds,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn request_timeout_seconds(&self) -> Option<u64> {
        self.request_timeout_seconds
    }
}

/// Fully resolved configuration for one run
///
/// The log level is not part of it: telemetry is initialised from the file
/// layer before resolution so resolution itself can be logged.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub request: RequestConfig,
    pub output: OutputFormat,
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn from_env(file: FileConfig, profile: Option<Profile>) -> AppResult<Self> {
        Self::from_lookup(file, profile, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from a file layer and an environment lookup
    ///
    /// `profile` takes precedence over the file's `profile`. Environment
    /// values take precedence over file values; empty values count as unset.
    ///
    /// # Errors
    /// `AppError::MissingSetting` when the endpoint URL or access key cannot
    /// be resolved, `AppError::Config` when a resolved value is invalid.
    pub fn from_lookup<F>(file: FileConfig, profile: Option<Profile>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let profile = profile.or(file.profile).unwrap_or_default();

        let url = get(profile.endpoint_var())
            .or(file.endpoint.url)
            .ok_or(AppError::MissingSetting {
                name: profile.endpoint_var(),
                what: "endpoint",
            })?;

        let api_key = get(profile.key_var())
            .map(ApiKey::new)
            .ok_or(AppError::MissingSetting {
                name: profile.key_var(),
                what: "credential",
            })?;

        let deployment = get(DEPLOYMENT_VAR)
            .or(file.endpoint.deployment)
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());

        let api_version = get(API_VERSION_VAR)
            .or(file.endpoint.api_version)
            .unwrap_or_else(|| profile.default_api_version().to_string());

        let endpoint = EndpointConfig::new(
            profile,
            url,
            deployment,
            api_key,
            api_version,
            file.endpoint.request_timeout_seconds,
        )?;

        file.request.validate().map_err(AppError::Config)?;

        tracing::debug!(
            profile = %profile,
            endpoint = %endpoint.url(),
            deployment = %endpoint.deployment(),
            api_version = %endpoint.api_version(),
            "Resolved configuration"
        );

        Ok(Self {
            endpoint,
            request: file.request,
            output: file.output.format,
        })
    }

    /// Build the request body for this configuration
    ///
    /// The inference profile names the model in the body; the openai profile
    /// addresses the deployment through the URL instead.
    pub fn build_request(&self) -> AppResult<ChatCompletionRequest> {
        let model = match self.endpoint.profile() {
            Profile::Inference => Some(self.endpoint.deployment()),
            Profile::Openai => None,
        };
        self.request.to_request(model).map_err(AppError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn inference_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            ("AZURE_INFERENCE_SDK_ENDPOINT", "https://example.test/models"),
            ("AZURE_INFERENCE_SDK_KEY", "test-key"),
        ])
    }

    #[test]
    fn test_deployment_defaults_when_unset() {
        let config = Config::from_lookup(FileConfig::default(), None, inference_env()).unwrap();
        assert_eq!(config.endpoint.deployment(), "gpt-4o");
        assert_eq!(config.endpoint.profile(), Profile::Inference);
        assert_eq!(config.endpoint.api_version(), "2024-05-01-preview");
        assert_eq!(config.request.max_tokens, 1000);
        assert_eq!(config.output, OutputFormat::Raw);
    }

    #[test]
    fn test_env_overrides_are_used() {
        let lookup = env(&[
            ("AZURE_INFERENCE_SDK_ENDPOINT", "https://other.test/models"),
            ("AZURE_INFERENCE_SDK_KEY", "override-key"),
            ("DEPLOYMENT_NAME", "phi-4"),
            ("AZURE_API_VERSION", "2025-01-01"),
        ]);
        let config = Config::from_lookup(FileConfig::default(), None, lookup).unwrap();
        assert_eq!(config.endpoint.url(), "https://other.test/models");
        assert_eq!(config.endpoint.api_key().expose(), "override-key");
        assert_eq!(config.endpoint.deployment(), "phi-4");
        assert_eq!(config.endpoint.api_version(), "2025-01-01");
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let lookup = env(&[("AZURE_INFERENCE_SDK_ENDPOINT", "https://example.test/models")]);
        let err = Config::from_lookup(FileConfig::default(), None, lookup).unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingSetting {
                name: "AZURE_INFERENCE_SDK_KEY",
                what: "credential"
            }
        ));
        assert!(err.to_string().contains("Missing credential"));
    }

    #[test]
    fn test_missing_endpoint_fails_fast() {
        let lookup = env(&[("AZURE_INFERENCE_SDK_KEY", "k")]);
        let err = Config::from_lookup(FileConfig::default(), None, lookup).unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingSetting {
                name: "AZURE_INFERENCE_SDK_ENDPOINT",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_env_value_counts_as_unset() {
        let lookup = env(&[
            ("AZURE_INFERENCE_SDK_ENDPOINT", "https://example.test/models"),
            ("AZURE_INFERENCE_SDK_KEY", "k"),
            ("DEPLOYMENT_NAME", ""),
        ]);
        let config = Config::from_lookup(FileConfig::default(), None, lookup).unwrap();
        assert_eq!(config.endpoint.deployment(), DEFAULT_DEPLOYMENT);
    }

    #[test]
    fn test_openai_profile_uses_its_own_variables() {
        let lookup = env(&[
            ("AZURE_OPENAI_ENDPOINT", "https://hub.openai.azure.com/"),
            ("AZURE_OPENAI_KEY", "openai-key"),
            // Ignored under the openai profile
            ("AZURE_INFERENCE_SDK_KEY", "inference-key"),
        ]);
        let config =
            Config::from_lookup(FileConfig::default(), Some(Profile::Openai), lookup).unwrap();
        assert_eq!(config.endpoint.profile(), Profile::Openai);
        assert_eq!(config.endpoint.api_key().expose(), "openai-key");
        assert_eq!(config.endpoint.api_version(), "2024-10-21");
    }

    #[test]
    fn test_file_values_apply_when_env_unset() {
        let file: FileConfig = r#"
profile = "openai"

[endpoint]
url = "https://file.test/"
deployment = "from-file"
request_timeout_seconds = 45
"#
        .parse()
        .unwrap();

        let lookup = env(&[("AZURE_OPENAI_KEY", "k"), ("DEPLOYMENT_NAME", "from-env")]);
        let config = Config::from_lookup(file, None, lookup).unwrap();
        assert_eq!(config.endpoint.profile(), Profile::Openai);
        assert_eq!(config.endpoint.url(), "https://file.test/");
        assert_eq!(config.endpoint.deployment(), "from-env");
        assert_eq!(config.endpoint.request_timeout_seconds(), Some(45));
    }

    #[test]
    fn test_profile_argument_overrides_file() {
        let file: FileConfig = "profile = \"openai\"".parse().unwrap();
        let config = Config::from_lookup(file, Some(Profile::Inference), inference_env()).unwrap();
        assert_eq!(config.endpoint.profile(), Profile::Inference);
    }

    #[test]
    fn test_log_level_precedence() {
        let file: FileConfig = "[observability]\nlog_level = \"debug\"".parse().unwrap();
        assert_eq!(file.log_level(None), "debug");
        assert_eq!(file.log_level(Some("trace")), "trace");
        assert_eq!(FileConfig::default().log_level(None), "warn");
    }

    #[test]
    fn test_file_rejects_api_key_field() {
        let result: AppResult<FileConfig> = "[endpoint]\napi_key = \"literal\"".parse();
        assert!(matches!(result, Err(AppError::ConfigParseFailed { .. })));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let lookup = env(&[
            ("AZURE_INFERENCE_SDK_ENDPOINT", "example.test/models"),
            ("AZURE_INFERENCE_SDK_KEY", "k"),
        ]);
        let err = Config::from_lookup(FileConfig::default(), None, lookup).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_timeout_bounds() {
        let zero: AppResult<FileConfig> = "[endpoint]\nrequest_timeout_seconds = 0".parse();
        assert!(matches!(zero, Err(AppError::ConfigValidationFailed { .. })));

        let huge: AppResult<FileConfig> = "[endpoint]\nrequest_timeout_seconds = 301".parse();
        assert!(matches!(huge, Err(AppError::ConfigValidationFailed { .. })));
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let config = Config::from_lookup(FileConfig::default(), None, inference_env()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-key"), "key leaked: {}", debug);
        assert!(debug.contains("ApiKey(***)"));
    }

    #[test]
    fn test_build_request_names_model_for_inference_only() {
        let inference = Config::from_lookup(FileConfig::default(), None, inference_env()).unwrap();
        assert_eq!(inference.build_request().unwrap().model(), Some("gpt-4o"));

        let lookup = env(&[
            ("AZURE_OPENAI_ENDPOINT", "https://hub.openai.azure.com"),
            ("AZURE_OPENAI_KEY", "k"),
        ]);
        let openai =
            Config::from_lookup(FileConfig::default(), Some(Profile::Openai), lookup).unwrap();
        assert_eq!(openai.build_request().unwrap().model(), None);
    }
}
