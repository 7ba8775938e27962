// ============================================================================
// Lua 引擎生命周期与执行桥接
// initialize → execute* → cleanup / reset
// ============================================================================

use crate::bindings::HostBridge;
use crate::config::EngineConfig;
use crate::core::{ConsoleError, ConsoleResult};
use crate::scripting::about;
use crate::scripting::output::{install_print, CaptureBuffer};
use crate::scripting::value::{ExecutionResult, ScriptValue};
use crate::vault::Vault;
use mlua::{Function, Lua, LuaOptions, MultiValue, StdLib};
use std::rc::Rc;

/// 以 `xpcall` 运行控制台代码块
///
/// 带 `message` 字段的错误对象折叠为该字段的文本，其余错误原样重新抛出。
/// Lua 5.4 中 `xpcall` 可跨越 yield，宿主异步调用不受影响。
const RUNNER_SOURCE: &str = r#"
local xpcall, type, tostring, error = xpcall, type, tostring, error

local function handler(err)
    if type(err) == "table" and err.message ~= nil then
        return tostring(err.message)
    end
    return err
end

local function finish(ok, ...)
    if ok then
        return ...
    end
    error((...), 0)
end

return function(chunk)
    return finish(xpcall(chunk, handler))
end
"#;

/// 存活的 VM 实例及其捕获缓冲区
struct Session {
    lua: Lua,
    runner: Function,
    capture: CaptureBuffer,
}

/// Lua 控制台引擎
///
/// 独占一个 VM 实例，状态只有两种：未初始化 / 就绪。
///
/// - `initialize` 幂等；失败时不保留任何半成品 VM
/// - `execute` 需要 `&mut self`，同一实例上的执行天然串行
/// - `cleanup` 幂等；之后 `execute` 返回 [`ConsoleError::NotInitialized`]
///
/// # 示例
///
/// ```no_run
/// use lua_console::{ExecutionResult, LuaEngine, MemoryVault};
/// use std::rc::Rc;
///
/// # async fn run() -> Result<(), lua_console::ConsoleError> {
/// let vault = Rc::new(MemoryVault::new("Notes"));
/// vault.insert("Untitled.md", "hello");
///
/// let mut engine = LuaEngine::new(vault);
/// engine.initialize()?;
/// let result = engine.execute("print(getNoteContent('Untitled'))").await?;
/// assert_eq!(result, ExecutionResult::Output("hello".to_string()));
/// engine.cleanup();
/// # Ok(())
/// # }
/// ```
pub struct LuaEngine {
    bridge: HostBridge,
    config: EngineConfig,
    session: Option<Session>,
}

impl LuaEngine {
    pub fn new(vault: Rc<dyn Vault>) -> Self {
        Self::with_config(vault, EngineConfig::default())
    }

    pub fn with_config(vault: Rc<dyn Vault>, config: EngineConfig) -> Self {
        Self {
            bridge: HostBridge::new(vault),
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 修改配置，从下一次 `initialize` 起生效
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// 创建 VM 并安装宿主绑定、`print` 捕获和版本命名空间
    pub fn initialize(&mut self) -> ConsoleResult<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let session = self.create_session().map_err(|e| {
            tracing::error!(target: "lua_console", "Failed to initialize Lua engine: {}", e);
            ConsoleError::Initialization(e)
        })?;

        self.session = Some(session);
        tracing::info!(target: "lua_console", "Lua engine initialized");
        Ok(())
    }

    fn create_session(&self) -> mlua::Result<Session> {
        let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())?;
        if let Some(limit) = self.config.memory_limit {
            lua.set_memory_limit(limit)?;
        }

        let capture = CaptureBuffer::new();
        self.bridge.install(&lua)?;
        install_print(&lua, Rc::new(capture.clone()))?;
        about::install_namespace(&lua)?;

        let runner = lua
            .load(RUNNER_SOURCE)
            .set_name("=runner")
            .eval::<Function>()?;

        Ok(Session {
            lua,
            runner,
            capture,
        })
    }

    /// 执行一段脚本
    ///
    /// 捕获到的非空打印输出优先于脚本返回值。脚本中发起的宿主异步操作
    /// （如 `Note`）全部完成之后才会返回。
    pub async fn execute(&mut self, source: &str) -> ConsoleResult<ExecutionResult> {
        let session = self.session.as_ref().ok_or(ConsoleError::NotInitialized)?;
        session.capture.clear();

        tracing::debug!(target: "lua_console", "Executing {} bytes", source.len());
        let name = self.config.lua_chunk_name();
        let outcome = async {
            let chunk = compile_chunk(&session.lua, source, &name)?;
            session.runner.call_async::<MultiValue>(chunk).await
        };
        let values = outcome
            .await
            .map_err(|e| {
                let err = ConsoleError::execution(&e);
                tracing::debug!(target: "lua_console", "Script failed: {}", err);
                err
            })?;

        let printed = session.capture.contents();
        let printed = printed.trim();
        if !printed.is_empty() {
            return Ok(ExecutionResult::Output(printed.to_string()));
        }

        let value = values
            .iter()
            .next()
            .map(ScriptValue::from_lua)
            .unwrap_or(ScriptValue::Nil);
        Ok(ExecutionResult::Value(value))
    }

    /// 当前 VM 的横幅文本
    pub fn banner(&self) -> ConsoleResult<String> {
        let session = self.session.as_ref().ok_or(ConsoleError::NotInitialized)?;
        let namespace: mlua::Table = session
            .lua
            .globals()
            .get(about::NAMESPACE)
            .map_err(|e| ConsoleError::execution(&e))?;
        namespace
            .get::<String>("header")
            .map_err(|e| ConsoleError::execution(&e))
    }

    /// 释放 VM；没有实例时什么也不做
    pub fn cleanup(&mut self) {
        if let Some(session) = self.session.take() {
            drop(session);
            tracing::info!(target: "lua_console", "Lua engine released");
        }
    }

    /// `cleanup` 后重新 `initialize`；初始化失败时引擎保持未初始化
    pub fn reset(&mut self) -> ConsoleResult<()> {
        self.cleanup();
        self.initialize()
    }
}

/// 先按表达式编译（`return <source>`），失败再按语句块编译
fn compile_chunk(lua: &Lua, source: &str, name: &str) -> mlua::Result<Function> {
    lua.load(format!("return {}", source))
        .set_name(name)
        .into_function()
        .or_else(|_| lua.load(source).set_name(name).into_function())
}

impl Drop for LuaEngine {
    fn drop(&mut self) {
        self.cleanup();
    }
}
