//! azprompt - one-shot chat completion runner
//!
//! Sends a fixed system/user message pair to an Azure AI inference or Azure
//! OpenAI chat completions endpoint and prints the response.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod output;
pub mod request;
pub mod runner;
pub mod telemetry;
