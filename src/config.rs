use crate::types::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Dimension of `text-embedding-ada-002` vectors; the `documents.embedding` column is sized to it.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub openai: OpenAIConfig,
    pub news: NewsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

// Keeps the password out of startup logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub api_base: String,
    pub embedding_model: String,
    pub completion_model: String,
    pub embedding_dimension: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_base", &self.api_base)
            .field("embedding_model", &self.embedding_model)
            .field("completion_model", &self.completion_model)
            .field("embedding_dimension", &self.embedding_dimension)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub use_sample_data: bool,
}

impl NewsConfig {
    /// Sample data is served when explicitly requested or when no BigKinds key exists.
    pub fn sample_mode(&self) -> bool {
        self.use_sample_data || self.api_key.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per outbound call. 1 keeps the fail-fast behaviour.
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load `.env`, an optional TOML file and the process environment, in increasing priority.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::default())
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &config::Config) -> AppResult<Self> {
        let api_key = optional_string(settings, "openai_api_key")?.ok_or_else(|| {
            AppError::Config("OPENAI_API_KEY must be set".to_string())
        })?;

        let embedding_dimension: usize =
            get_or(settings, "embedding_dimension", DEFAULT_EMBEDDING_DIMENSION)?;
        if embedding_dimension == 0 {
            return Err(AppError::Config("EMBEDDING_DIMENSION must be positive".to_string()));
        }

        let max_attempts: u32 = get_or(settings, "http_max_attempts", 1)?;
        if max_attempts == 0 {
            return Err(AppError::Config("HTTP_MAX_ATTEMPTS must be at least 1".to_string()));
        }

        Ok(Self {
            server: ServerConfig {
                port: get_or(settings, "port", 8000)?,
                host: get_or(settings, "host", "0.0.0.0".to_string())?,
                cors_allowed_origins: get_or(settings, "allowed_origins", "*".to_string())?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            database: DatabaseConfig {
                url: optional_string(settings, "database_url")?,
                host: get_or(settings, "db_host", "localhost".to_string())?,
                port: get_or(settings, "db_port", 5432)?,
                name: get_or(settings, "db_name", "vectordb".to_string())?,
                user: get_or(settings, "db_user", "postgres".to_string())?,
                password: get_or(settings, "db_password", "postgres".to_string())?,
                max_connections: get_or(settings, "db_max_connections", 10)?,
                min_connections: get_or(settings, "db_min_connections", 1)?,
            },
            openai: OpenAIConfig {
                api_key,
                api_base: get_or(settings, "openai_api_base", "https://api.openai.com/v1".to_string())?,
                embedding_model: get_or(
                    settings,
                    "openai_embedding_model",
                    "text-embedding-ada-002".to_string(),
                )?,
                completion_model: get_or(
                    settings,
                    "openai_completion_model",
                    "gpt-4o-mini".to_string(),
                )?,
                embedding_dimension,
                temperature: get_or(settings, "openai_temperature", 0.0)?,
                max_tokens: get_or(settings, "openai_max_tokens", 1024)?,
            },
            news: NewsConfig {
                api_key: optional_string(settings, "bigkinds_api_key")?,
                api_url: get_or(settings, "bigkinds_api_url", "https://tools.kinds.or.kr".to_string())?,
                use_sample_data: get_or(settings, "use_sample_data", true)?,
            },
            http: HttpConfig {
                timeout_secs: get_or(settings, "http_timeout_secs", 60)?,
                max_attempts,
            },
            logging: LoggingConfig {
                filter: get_or(
                    settings,
                    "log_filter",
                    "vector_news=debug,tower_http=debug,axum=debug".to_string(),
                )?,
                directory: optional_string(settings, "log_dir")?.map(PathBuf::from),
            },
        })
    }

    /// Connection URL for the pool, composed from parts when `DATABASE_URL` is absent.
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.database.user,
                self.database.password,
                self.database.host,
                self.database.port,
                self.database.name
            ),
        }
    }
}

fn get_or<T: DeserializeOwned>(settings: &config::Config, key: &str, default: T) -> AppResult<T> {
    match settings.get::<T>(key) {
        Ok(value) => Ok(value),
        Err(config::ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(AppError::Config(format!("{}: {}", key.to_uppercase(), e))),
    }
}

// Empty values count as unset so `FOO=` in `.env` does not enable anything.
fn optional_string(settings: &config::Config, key: &str) -> AppResult<Option<String>> {
    match settings.get_string(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(AppError::Config(format!("{}: {}", key.to_uppercase(), e))),
    }
}
