//! 核心模块
//!
//! 包含控制台的基础设施：
//! - `error` - 错误类型定义
//! - `macros` - 通用宏

pub mod error;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{error_message, BridgeError, BridgeResult, ConsoleError, ConsoleResult};
