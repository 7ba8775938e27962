use mlua::{Table, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 结构化值转换的最大嵌套深度，超出部分（包括自引用表）视为不透明值
pub const MAX_CONVERSION_DEPTH: usize = 32;

/// 脚本值 - 从 VM 取出后与 VM 无关的普通数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(BTreeMap<String, ScriptValue>),
    /// 函数、协程、userdata 等无法脱离 VM 的值，只保留类型名
    Opaque(String),
}

impl ScriptValue {
    pub fn from_lua(value: &Value) -> Self {
        Self::convert(value, 0)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    fn convert(value: &Value, depth: usize) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Boolean(b) => Self::Boolean(*b),
            Value::Integer(i) => Self::Integer(*i),
            Value::Number(n) => Self::Number(*n),
            Value::String(s) => Self::String(s.to_string_lossy().into()),
            Value::Table(table) if depth < MAX_CONVERSION_DEPTH => Self::from_table(table, depth),
            other => Self::Opaque(other.type_name().to_string()),
        }
    }

    fn from_table(table: &Table, depth: usize) -> Self {
        let mut entries = Vec::new();
        for pair in table.clone().pairs::<Value, Value>() {
            match pair {
                Ok(entry) => entries.push(entry),
                Err(_) => return Self::Opaque("table".to_string()),
            }
        }

        let len = table.raw_len();
        let is_sequence = len > 0
            && entries.len() == len
            && entries
                .iter()
                .all(|(key, _)| matches!(key, Value::Integer(i) if *i >= 1 && *i as usize <= len));

        if is_sequence {
            let mut items = vec![Self::Nil; len];
            for (key, value) in &entries {
                if let Value::Integer(i) = key {
                    items[*i as usize - 1] = Self::convert(value, depth + 1);
                }
            }
            return Self::Array(items);
        }

        let object = entries
            .iter()
            .map(|(key, value)| (key_to_string(key), Self::convert(value, depth + 1)))
            .collect();
        Self::Object(object)
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string_lossy().into(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.type_name().to_string(),
    }
}

impl fmt::Display for ScriptValue {
    /// 标量按原样输出，结构化值输出为缩进 JSON
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Opaque(kind) => write!(f, "<{}>", kind),
            Self::Array(_) | Self::Object(_) => {
                let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for ScriptValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// 一次 `execute` 的结果
///
/// 捕获到的打印输出优先；没有输出时才返回最后一个表达式的值。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExecutionResult {
    /// `print` 捕获的文本（已去除首尾空白）
    Output(String),
    /// 脚本返回值，可能为 `Nil`
    Value(ScriptValue),
}

impl ExecutionResult {
    /// 呈现给控制台的文本；没有输出也没有值时返回 `None`
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Output(text) => Some(text.clone()),
            Self::Value(value) if value.is_nil() => None,
            Self::Value(value) => Some(value.to_string()),
        }
    }

    pub fn as_output(&self) -> Option<&str> {
        match self {
            Self::Output(text) => Some(text),
            Self::Value(_) => None,
        }
    }
}
