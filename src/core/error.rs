//! 统一错误处理模块
//!
//! 提供控制台范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **引擎边界错误** (`ConsoleError`): `initialize` / `execute` 的调用方可见的错误
//! - **宿主桥接错误** (`BridgeError`): 在 VM 内部由宿主绑定抛出，
//!   经过 `execute` 边界后统一折叠为 `ConsoleError::Execution`

use thiserror::Error;

/// 引擎边界错误类型
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// VM 创建或宿主绑定安装失败，引擎保持未初始化
    #[error("Lua initialization failed: {0}")]
    Initialization(#[source] mlua::Error),

    /// 在没有存活 VM 的情况下调用 `execute`
    #[error("Lua engine not initialized")]
    NotInitialized,

    /// 脚本求值失败，引擎仍然可用
    #[error("{message}")]
    Execution { message: String },
}

impl ConsoleError {
    /// 将 VM 内部错误折叠为 `Execution`，不泄露 VM 错误对象
    pub fn execution(err: &mlua::Error) -> Self {
        Self::Execution {
            message: error_message(err),
        }
    }

    /// 执行错误的消息文本
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Execution { message } => Some(message),
            _ => None,
        }
    }
}

/// 宿主桥接错误
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Note not found: {name}")]
    DocumentNotFound { name: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<BridgeError> for mlua::Error {
    fn from(err: BridgeError) -> Self {
        mlua::Error::external(err)
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
pub type BridgeResult<T> = Result<T, BridgeError>;

const TRACEBACK_MARKER: &str = "\nstack traceback:";

/// 从 VM 错误中提取面向用户的消息
///
/// 回调错误沿 `cause` 链追溯到根因；运行时错误去掉附加的调用栈。
pub fn error_message(err: &mlua::Error) -> String {
    match err {
        mlua::Error::CallbackError { cause, .. } => error_message(cause),
        mlua::Error::WithContext { cause, .. } => error_message(cause),
        mlua::Error::RuntimeError(message) => strip_traceback(message),
        mlua::Error::SyntaxError { message, .. } => strip_traceback(message),
        mlua::Error::ExternalError(source) => source.to_string(),
        other => strip_traceback(&other.to_string()),
    }
}

fn strip_traceback(message: &str) -> String {
    match message.find(TRACEBACK_MARKER) {
        Some(index) => message[..index].trim_end().to_string(),
        None => message.trim_end().to_string(),
    }
}
