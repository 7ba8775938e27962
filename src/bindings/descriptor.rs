use crate::vault::DocumentRef;
use mlua::{IntoLua, Lua, Value};

/// 暴露给脚本的文档描述
///
/// 每次调用即时生成，不缓存。列表类访问器不带 `content`，避免无界读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub path: String,
    pub name: String,
    pub basename: String,
    pub extension: String,
    pub content: Option<String>,
}

impl DocumentDescriptor {
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}

impl From<&DocumentRef> for DocumentDescriptor {
    fn from(document: &DocumentRef) -> Self {
        Self {
            path: document.path.clone(),
            name: document.name().to_string(),
            basename: document.basename().to_string(),
            extension: document.extension().to_string(),
            content: None,
        }
    }
}

impl IntoLua for DocumentDescriptor {
    fn into_lua(self, lua: &Lua) -> mlua::Result<Value> {
        let table = lua.create_table()?;
        table.set("path", self.path)?;
        table.set("name", self.name)?;
        table.set("basename", self.basename)?;
        table.set("extension", self.extension)?;
        if let Some(content) = self.content {
            table.set("content", content)?;
        }
        Ok(Value::Table(table))
    }
}
