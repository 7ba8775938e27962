pub mod about;
pub mod engine;
pub mod output;
pub mod value;

pub use engine::LuaEngine;
pub use output::{CaptureBuffer, OutputSink};
pub use value::{ExecutionResult, ScriptValue};
