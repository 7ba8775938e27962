use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 允许的最小内存上限（字节）
pub const MIN_MEMORY_LIMIT: usize = 64 * 1024;

/// 引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 脚本块名称，出现在错误位置中（`console:1: ...`）
    pub chunk_name: String,

    /// VM 内存上限（字节），`None` 表示不限制
    pub memory_limit: Option<usize>,
}

impl_default!(EngineConfig {
    chunk_name: "console".to_string(),
    memory_limit: None,
});

impl EngineConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.chunk_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Chunk name must not be empty".to_string(),
            ));
        }
        if let Some(limit) = self.memory_limit {
            if limit < MIN_MEMORY_LIMIT {
                return Err(ConfigError::ValidationError(format!(
                    "Memory limit {} is below the minimum of {} bytes",
                    limit, MIN_MEMORY_LIMIT
                )));
            }
        }
        Ok(())
    }

    /// Lua 使用的块名称
    ///
    /// `=` 前缀让 Lua 原样显示名称，而不是 `[string "..."]`。
    pub(crate) fn lua_chunk_name(&self) -> String {
        format!("={}", self.chunk_name)
    }
}
