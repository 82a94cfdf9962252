use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use std::fmt;

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub gateway: GatewayConfig,
    pub worker: WorkerConfig,
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub kanji_list_url: String,
    pub katakana_list_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub enable_unlock_sweep: bool,
    pub sweep_cron: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("cors_origin", &self.cors_origin)
            .field("gateway", &self.gateway)
            .field("worker", &self.worker)
            .finish()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("model", &self.model)
            .field("kanji_list_url", &self.kanji_list_url)
            .field("katakana_list_url", &self.katakana_list_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mock: true,
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "mixtral-8x7b-32768".to_string(),
            kanji_list_url: "https://kanjiapi.dev/v1/kanji/grade-1".to_string(),
            katakana_list_url: "https://api.nihongoresources.com/kana/katakana".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = GatewayConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3417_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/nihongo.sled"),
            cors_origin: env_or("CORS_ORIGIN", "*"),
            gateway: GatewayConfig {
                enabled: env_or_bool("GATEWAY_ENABLED", defaults.enabled),
                mock: env_or_bool("GATEWAY_MOCK", defaults.mock),
                api_url: env_or("LLM_API_URL", &defaults.api_url),
                api_key: env_or("LLM_API_KEY", ""),
                model: env_or("LLM_MODEL", &defaults.model),
                kanji_list_url: env_or("KANJI_LIST_URL", &defaults.kanji_list_url),
                katakana_list_url: env_or("KATAKANA_LIST_URL", &defaults.katakana_list_url),
                timeout_secs: env_or_parse("LLM_TIMEOUT_SECS", defaults.timeout_secs),
            },
            worker: WorkerConfig {
                enable_unlock_sweep: env_or_bool("SWEEP_ENABLED", true),
                sweep_cron: env_or("SWEEP_CRON", "0 */30 * * * *"),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
