use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use url::Url;

use crate::error::{AppError, Result};
use crate::extractor::OutputMode;
use crate::extractor::subprocess::DEFAULT_OUTPUT_FILE;

/// Origins allowed to call `/scrape` from a browser.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// How the gate reaches its extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorConfig {
    InProcess,
    Subprocess {
        program: PathBuf,
        args: Vec<String>,
        output: OutputMode,
    },
    /// Another scrape service; `endpoint` is its full `/scrape` URL.
    Remote {
        endpoint: Url,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub allowed_origins: AllowedOrigins,
    pub extractor: ExtractorConfig,
    pub scrape_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Load server configuration with defaults
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let allowed_origins = parse_origins(&var("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()))?;
        let extractor = parse_extractor(&var)?;
        let scrape_timeout = parse_secs(&var, "SCRAPE_TIMEOUT_SECS", 60)?;
        let fetch_timeout = parse_secs(&var, "FETCH_TIMEOUT_SECS", 15)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            allowed_origins,
            extractor,
            scrape_timeout,
            fetch_timeout,
        })
    }
}

fn parse_origins(raw: &str) -> Result<AllowedOrigins> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return Ok(AllowedOrigins::Any);
    }

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| AppError::ConfigError(format!("Invalid origin {:?}: {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;
    if origins.is_empty() {
        return Err(AppError::ConfigError(format!("ALLOWED_ORIGINS lists no origins: {:?}", raw)));
    }

    Ok(AllowedOrigins::List(origins))
}

fn parse_extractor<F>(var: &F) -> Result<ExtractorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mode = var("EXTRACTOR_MODE").unwrap_or_else(|| "in-process".to_string());
    match mode.trim() {
        "in-process" | "inprocess" => Ok(ExtractorConfig::InProcess),
        "subprocess" => {
            let command = var("EXTRACTOR_COMMAND").ok_or_else(|| {
                AppError::ConfigError("EXTRACTOR_COMMAND is required in subprocess mode".to_string())
            })?;
            let mut parts = command.split_whitespace().map(str::to_string);
            let program = parts
                .next()
                .ok_or_else(|| AppError::ConfigError("EXTRACTOR_COMMAND is empty".to_string()))?;
            let args = parts.collect();

            let output = match var("EXTRACTOR_OUTPUT").as_deref().map(str::trim) {
                None | Some("stdout") => OutputMode::Stdout,
                Some("file") => OutputMode::File(
                    var("EXTRACTOR_OUTPUT_FILE").unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
                ),
                Some(other) => {
                    return Err(AppError::ConfigError(format!("Invalid EXTRACTOR_OUTPUT: {}", other)));
                }
            };

            Ok(ExtractorConfig::Subprocess {
                program: absolute_program(program)?,
                args,
                output,
            })
        }
        "remote" => {
            let raw = var("EXTRACTOR_REMOTE_URL")
                .or_else(|| var("PYTHON_API_URL"))
                .ok_or_else(|| {
                    AppError::ConfigError("EXTRACTOR_REMOTE_URL is required in remote mode".to_string())
                })?;
            Ok(ExtractorConfig::Remote {
                endpoint: remote_endpoint(&raw)?,
            })
        }
        other => Err(AppError::ConfigError(format!("Invalid EXTRACTOR_MODE: {}", other))),
    }
}

// Accepts either the service base URL or its full `/scrape` URL.
fn remote_endpoint(raw: &str) -> Result<Url> {
    let base = raw.trim().trim_end_matches('/');
    let endpoint = if base.ends_with("/scrape") {
        base.to_string()
    } else {
        format!("{}/scrape", base)
    };

    let url = Url::parse(&endpoint)
        .map_err(|e| AppError::ConfigError(format!("Invalid EXTRACTOR_REMOTE_URL {:?}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::ConfigError(format!("EXTRACTOR_REMOTE_URL must be http(s): {}", raw)));
    }
    Ok(url)
}

// The child runs inside its scratch directory, so a relative program path
// is pinned to the directory the server started in.
fn absolute_program(program: String) -> Result<PathBuf> {
    let path = PathBuf::from(program);
    if path.is_absolute() || path.components().count() == 1 {
        return Ok(path);
    }
    let cwd = env::current_dir()
        .map_err(|e| AppError::ConfigError(format!("Cannot resolve {}: {}", path.display(), e)))?;
    Ok(cwd.join(path))
}

fn parse_secs<F>(var: &F, key: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))?,
        None => default,
    };
    if secs == 0 {
        return Err(AppError::ConfigError(format!("{} must be greater than zero", key)));
    }
    Ok(Duration::from_secs(secs))
}
