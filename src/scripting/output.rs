//! 输出捕获
//!
//! VM 在构造时就绑定一个宿主提供的输出接收器，`print` 直接写入接收器，
//! 不会写到任何真实的输出流。

use crate::bindings::lua_tostring;
use mlua::{Lua, Value, Variadic};
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 宿主提供的输出接收器
pub trait OutputSink: 'static {
    /// 写入一行（不含换行符）
    fn write_line(&self, line: &str);
}

/// 捕获缓冲区
///
/// 每个 VM 实例一份，由引擎在每次 `execute` 开始时清空。
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<String>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// 当前缓冲内容的副本
    pub fn contents(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputSink for CaptureBuffer {
    fn write_line(&self, line: &str) {
        let mut buffer = self.lock();
        buffer.push_str(line);
        buffer.push('\n');
    }
}

/// 安装 `print`：参数按 `tostring` 转换后以制表符连接，写入接收器
pub fn install_print(lua: &Lua, sink: Rc<dyn OutputSink>) -> mlua::Result<()> {
    let print = lua.create_function(move |lua, args: Variadic<Value>| {
        let parts = args
            .iter()
            .map(|value| lua_tostring(lua, value))
            .collect::<mlua::Result<Vec<_>>>()?;
        sink.write_line(&parts.join("\t"));
        Ok(())
    })?;
    lua.globals().set("print", print)
}
