//! Command-line interface for azprompt
//!
//! With no arguments the binary sends the default conversation using
//! settings from the environment.

use crate::config::{OutputFormat, Profile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// One-shot chat completion runner for Azure-hosted inference endpoints
#[derive(Parser)]
#[command(name = "azprompt")]
#[command(version)]
#[command(about = "Send one chat completion request and print the response")]
#[command(
    long_about = "azprompt sends a system/user message pair to an Azure AI inference or \
    Azure OpenAI chat completions endpoint and prints the response. The endpoint and key \
    are read from the environment (AZURE_INFERENCE_SDK_ENDPOINT / AZURE_INFERENCE_SDK_KEY, \
    or AZURE_OPENAI_ENDPOINT / AZURE_OPENAI_KEY for the openai profile)."
)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint profile (overrides the config file)
    #[arg(short, long, value_enum)]
    pub profile: Option<Profile>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log level when RUST_LOG is not set (overrides the config file)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# azprompt Configuration
# =======================
#
# Every setting is optional. Environment variables override values in this
# file, and command-line flags override both.
#
# The access key is never read from this file. Set AZURE_INFERENCE_SDK_KEY
# (inference profile) or AZURE_OPENAI_KEY (openai profile).

# Endpoint flavour:
#   - "inference": Azure AI model inference (model named in the request body)
#   - "openai":    Azure OpenAI deployment (deployment named in the URL)
profile = "inference"

# ─────────────────────────────────────────────────────────────────────────────
# ENDPOINT
# ─────────────────────────────────────────────────────────────────────────────

[endpoint]
# Overridden by AZURE_INFERENCE_SDK_ENDPOINT / AZURE_OPENAI_ENDPOINT
# url = "https://your-resource.services.ai.azure.com/models"

# Overridden by DEPLOYMENT_NAME
deployment = "gpt-4o"

# Overridden by AZURE_API_VERSION (defaults depend on the profile)
# api_version = "2024-05-01-preview"

# Request timeout in seconds (1-300). Unset uses the HTTP client default.
# request_timeout_seconds = 60

# ─────────────────────────────────────────────────────────────────────────────
# REQUEST
# ─────────────────────────────────────────────────────────────────────────────

[request]
system_prompt = "You are a helpful assistant."
user_prompt = "What are 3 things to visit in Seattle?"
max_tokens = 1000

# Optional sampling parameters (omitted from the request when unset)
# temperature = 0.7
# frequency_penalty = 0.0
# presence_penalty = 0.0

# ─────────────────────────────────────────────────────────────────────────────
# OUTPUT
# ─────────────────────────────────────────────────────────────────────────────

[output]
# "raw": response body exactly as received
# "pretty": indented response JSON
# "summary": first choice content, a separator, then token usage
format = "raw"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG takes precedence)
log_level = "warn"
"#
}
