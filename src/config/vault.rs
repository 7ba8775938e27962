use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 文档库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// 文档库根目录
    pub root: PathBuf,

    /// 启动时的活动文档（相对路径）
    pub active: Option<String>,
}

impl_default!(VaultConfig {
    root: PathBuf::from("."),
    active: None,
});

impl VaultConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Vault root must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
