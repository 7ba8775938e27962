/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量和日志初始化
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod engine;
pub mod vault;

pub use engine::EngineConfig;
pub use vault::VaultConfig;

/// 控制台配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "lua_console.toml";

/// 控制台主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// 引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 文档库配置
    #[serde(default)]
    pub vault: VaultConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConsoleConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("LUA_CONSOLE_CHUNK_NAME") {
            if !val.is_empty() {
                self.engine.chunk_name = val;
            }
        }
        if let Ok(val) = env::var("LUA_CONSOLE_MEMORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.engine.memory_limit = Some(limit);
            }
        }
        if let Ok(val) = env::var("LUA_CONSOLE_VAULT_ROOT") {
            self.vault.root = PathBuf::from(val);
        }
        if let Ok(val) = env::var("LUA_CONSOLE_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.vault.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./lua_console.toml
    /// 2. <config_dir>/lua_console/config.toml
    /// 3. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file(CONFIG_FILE_NAME) {
            tracing::debug!(target: "lua_console", "Loaded config from {}", CONFIG_FILE_NAME);
            return config;
        }

        if let Some(dir) = dirs::config_dir() {
            let config_path = dir.join("lua_console").join("config.toml");
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::debug!(target: "lua_console", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::debug!(target: "lua_console", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// 初始化日志系统
///
/// 配置tracing日志框架。`RUST_LOG`环境变量优先，否则使用配置的级别。
pub fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
