//! Front matter 与 YAML 解析
//!
//! 供脚本侧的 `app.getFrontmatter` / `app.parseYaml` 使用。

use crate::core::BridgeResult;
use mlua::{Lua, LuaSerdeExt, SerializeOptions, Value};
use serde_yaml::{Mapping, Value as YamlValue};

const FENCE: &str = "---";
const END_FENCES: [&str; 2] = ["---", "..."];

/// 提取文档开头 `---` 围栏之间的 front matter 原文
pub fn extract_frontmatter(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if first.trim_end() != FENCE {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if END_FENCES.contains(&line.trim_end()) {
            return Some(&text[start..offset]);
        }
        offset += line.len();
    }
    None
}

/// 解析任意 YAML 文本
pub fn parse_yaml(text: &str) -> BridgeResult<YamlValue> {
    Ok(serde_yaml::from_str(text)?)
}

/// 解析文档的 front matter；没有 front matter 时返回 `None`
///
/// 空的 front matter 解析为空映射。
pub fn parse_frontmatter(text: &str) -> BridgeResult<Option<YamlValue>> {
    let Some(block) = extract_frontmatter(text) else {
        return Ok(None);
    };

    match parse_yaml(block)? {
        YamlValue::Null => Ok(Some(YamlValue::Mapping(Mapping::new()))),
        value => Ok(Some(value)),
    }
}

/// 把 YAML 值转换为 Lua 值，`null` 映射为 `nil`
pub fn yaml_to_lua(lua: &Lua, value: &YamlValue) -> mlua::Result<Value> {
    let options = SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false);
    lua.to_value_with(value, options)
}
