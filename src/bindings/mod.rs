//! 宿主桥接
//!
//! 把宿主文档库翻译成注入 VM 全局命名空间的绑定：
//!
//! - `app` - `getName` / `getActiveFile` / `getAllFiles` / `getFrontmatter` / `parseYaml`
//! - `log(value)` - 写入宿主诊断通道并原样返回
//! - `Note(nameOrPath)` - 异步查找并读取文档
//! - `getNoteContent(nameOrPath)` - 只取 `Note(...).content`
//!
//! 绑定不缓存任何结果，每次调用都重新查询宿主的实时状态。

use crate::core::{BridgeError, BridgeResult};
use crate::vault::{self, Vault};
use mlua::{Function, Lua, Value};
use std::rc::Rc;

pub mod descriptor;
pub mod metadata;

pub use descriptor::DocumentDescriptor;

/// 宿主桥接上下文
///
/// 只持有宿主引用，不持有 VM；每次 `initialize` 都重新安装。
#[derive(Clone)]
pub struct HostBridge {
    vault: Rc<dyn Vault>,
}

impl HostBridge {
    pub fn new(vault: Rc<dyn Vault>) -> Self {
        Self { vault }
    }

    pub fn vault_name(&self) -> String {
        self.vault.name()
    }

    pub fn active_file(&self) -> Option<DocumentDescriptor> {
        self.vault.active_file().as_ref().map(DocumentDescriptor::from)
    }

    /// 所有文档的轻量描述（不含内容）
    pub fn all_files(&self) -> Vec<DocumentDescriptor> {
        self.vault
            .markdown_files()
            .iter()
            .map(DocumentDescriptor::from)
            .collect()
    }

    /// 按名称或路径查找文档并读取内容
    pub async fn document(&self, query: &str) -> BridgeResult<DocumentDescriptor> {
        let documents = self.vault.markdown_files();
        let found =
            vault::resolve(&documents, query).ok_or_else(|| BridgeError::DocumentNotFound {
                name: query.to_string(),
            })?;

        let content = self
            .vault
            .read(found)
            .await
            .map_err(|source| BridgeError::Read {
                path: found.path.clone(),
                source,
            })?;

        Ok(DocumentDescriptor::from(found).with_content(content))
    }

    /// `document` 的内容投影
    pub async fn content(&self, query: &str) -> BridgeResult<String> {
        let document = self.document(query).await?;
        Ok(document.content.unwrap_or_default())
    }

    /// 安装宿主绑定到 VM 全局命名空间
    pub fn install(&self, lua: &Lua) -> mlua::Result<()> {
        let globals = lua.globals();

        globals.set("app", self.app_table(lua)?)?;

        globals.set(
            "log",
            lua.create_function(|lua, value: Value| {
                let text = lua_tostring(lua, &value)?;
                tracing::info!(target: "lua", "{}", text);
                Ok(value)
            })?,
        )?;

        let bridge = self.clone();
        globals.set(
            "Note",
            lua.create_async_function(move |_, query: String| {
                let bridge = bridge.clone();
                async move { bridge.document(&query).await.map_err(mlua::Error::from) }
            })?,
        )?;

        let bridge = self.clone();
        globals.set(
            "getNoteContent",
            lua.create_async_function(move |_, query: String| {
                let bridge = bridge.clone();
                async move { bridge.content(&query).await.map_err(mlua::Error::from) }
            })?,
        )?;

        Ok(())
    }

    fn app_table(&self, lua: &Lua) -> mlua::Result<mlua::Table> {
        let app = lua.create_table()?;

        let bridge = self.clone();
        app.set(
            "getName",
            lua.create_function(move |_, ()| Ok(bridge.vault_name()))?,
        )?;

        let bridge = self.clone();
        app.set(
            "getActiveFile",
            lua.create_function(move |_, ()| Ok(bridge.active_file()))?,
        )?;

        let bridge = self.clone();
        app.set(
            "getAllFiles",
            lua.create_function(move |_, ()| Ok(bridge.all_files()))?,
        )?;

        app.set(
            "getFrontmatter",
            lua.create_function(|lua, text: String| {
                match metadata::parse_frontmatter(&text)? {
                    Some(value) => metadata::yaml_to_lua(lua, &value),
                    None => Ok(Value::Nil),
                }
            })?,
        )?;

        app.set(
            "parseYaml",
            lua.create_function(|lua, text: String| {
                let value = metadata::parse_yaml(&text)?;
                metadata::yaml_to_lua(lua, &value)
            })?,
        )?;

        Ok(app)
    }
}

/// 按 Lua `tostring` 语义把值转换为字符串
pub(crate) fn lua_tostring(lua: &Lua, value: &Value) -> mlua::Result<String> {
    if let Value::String(s) = value {
        return Ok(s.to_string_lossy().into());
    }
    let tostring: Function = lua.globals().get("tostring")?;
    tostring.call::<String>(value.clone())
}
