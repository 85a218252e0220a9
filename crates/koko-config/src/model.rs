//! Configuration schema for Koko.

use serde::{Deserialize, Serialize};

/// Environment variables consulted for the model API key, in order.
const API_KEY_ENV_VARS: &[&str] = &["KOKO_OPENAI_API_KEY", "OPENAI_API_KEY"];
/// Environment variable consulted for the database password.
const PG_PASSWORD_ENV_VAR: &str = "KOKO_PG_PASSWORD";

/// Root config for the Koko backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KokoConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

impl KokoConfig {
    /// Fill secret fields from the environment when the config left them unset.
    ///
    /// `KOKO_OPENAI_API_KEY` (then `OPENAI_API_KEY`) supplies the model key and
    /// `KOKO_PG_PASSWORD` the database password, so neither has to live in a
    /// config file on disk.
    pub fn resolve_env_secrets(&mut self) {
        if self.model.api_key.is_none() {
            self.model.api_key = API_KEY_ENV_VARS
                .iter()
                .find_map(|name| std::env::var(name).ok())
                .filter(|value| !value.is_empty());
        }
        if self.database.password.is_none()
            && let Ok(password) = std::env::var(PG_PASSWORD_ENV_VAR)
            && !password.is_empty()
        {
            self.database.password = Some(password);
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for the HTTP listener.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional API key; when set, requests must carry it in `X-API-Key`.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Model provider configuration for the chat gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name to request.
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key; normally resolved from the environment, not from disk.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            name: default_model_name(),
            max_tokens: default_max_tokens(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_name() -> String {
    "gpt-4.1".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

/// Postgres connection configuration.
///
/// Field aliases accept the uppercase key names used by the legacy
/// `config.json` (`PG_HOST`, `PG_PORT`, ...) so existing deployments keep
/// working unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    #[serde(default = "default_pg_host", alias = "PG_HOST")]
    pub host: String,
    /// Database port.
    #[serde(default = "default_pg_port", alias = "PG_PORT")]
    pub port: u16,
    /// Database name.
    #[serde(default = "default_pg_dbname", alias = "PG_DBNAME")]
    pub dbname: String,
    /// Database user.
    #[serde(default = "default_pg_user", alias = "PG_USER")]
    pub user: String,
    /// Database password; normally resolved from the environment.
    #[serde(default, alias = "PG_PASSWORD")]
    pub password: Option<String>,
    /// Whether to require TLS on the connection.
    #[serde(default = "default_true")]
    pub require_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_pg_host(),
            port: default_pg_port(),
            dbname: default_pg_dbname(),
            user: default_pg_user(),
            password: None,
            require_tls: true,
        }
    }
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_dbname() -> String {
    "koko".to_string()
}

fn default_pg_user() -> String {
    "postgres".to_string()
}

fn default_true() -> bool {
    true
}

/// Conversation transcript configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// System prompt seeded at index 0 of every conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Maximum transcript length before the oldest non-system entries drop.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_messages: default_max_messages(),
        }
    }
}

fn default_system_prompt() -> String {
    "Your name is Koko.\n\
     You are a helpful, intelligent assistant.\n\
     You explain things clearly and keep answers practical."
        .to_string()
}

fn default_max_messages() -> usize {
    60
}

/// Pacing for the `/chat_stream` responder.
///
/// All delays default to zero. Sleep-based pacing can be re-enabled through
/// configuration but is purely cosmetic, not flow control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Delay before the first delta frame, in milliseconds.
    #[serde(default)]
    pub initial_delay_ms: u64,
    /// Characters per delta frame.
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    /// Delay between delta frames, in milliseconds.
    #[serde(default)]
    pub inter_chunk_delay_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 0,
            chunk_chars: default_chunk_chars(),
            inter_chunk_delay_ms: 0,
        }
    }
}

fn default_chunk_chars() -> usize {
    24
}

/// Memory notebook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the JSON array file holding memory entries.
    #[serde(default = "default_memory_path")]
    pub path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
        }
    }
}

fn default_memory_path() -> String {
    ".koko/memories.json".to_string()
}

/// Document upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    8 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::{DatabaseConfig, KokoConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_expected_values() {
        let config = KokoConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.name, "gpt-4.1");
        assert_eq!(config.model.max_tokens, 500);
        assert_eq!(config.streaming.inter_chunk_delay_ms, 0);
        assert!(config.conversation.system_prompt.contains("Koko"));
    }

    #[test]
    fn database_accepts_legacy_uppercase_keys() {
        let raw = r#"{
            "PG_HOST": "db.internal",
            "PG_PORT": 5433,
            "PG_DBNAME": "sales",
            "PG_USER": "reader",
            "PG_PASSWORD": "hunter2"
        }"#;
        let parsed: DatabaseConfig = serde_json::from_str(raw).expect("decode");
        assert_eq!(parsed.host, "db.internal");
        assert_eq!(parsed.port, 5433);
        assert_eq!(parsed.dbname, "sales");
        assert_eq!(parsed.user, "reader");
        assert_eq!(parsed.password, Some("hunter2".to_string()));
        assert!(parsed.require_tls);
    }
}
