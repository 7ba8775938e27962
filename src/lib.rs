//! # Lua Console
//!
//! An embedded Lua 5.4 console with a bridge into a markdown document vault.
//!
//! ## Features
//!
//! - **Engine lifecycle**: `initialize` / `execute` / `cleanup` / `reset` over a single owned VM
//! - **Output capture**: `print` writes into a host-supplied sink, never to a real stream
//! - **Host bridge**: `app`, `log`, `Note` and `getNoteContent` bindings backed by a [`Vault`]
//! - **Async bridging**: host reads started from a script complete before `execute` returns
//! - **Metadata**: front matter and YAML parsing exposed to scripts
//!
//! ## Architecture Design
//!
//! - **Vault**: the host's document store, queried live on every call
//! - **Bindings**: stateless translation of vault data into Lua values
//! - **Scripting**: the engine owning the VM, its capture buffer and error normalization
//!
//! ### Example
//!
//! ```no_run
//! use lua_console::{LuaEngine, MemoryVault};
//! use std::rc::Rc;
//!
//! # async fn run() -> Result<(), lua_console::ConsoleError> {
//! let vault = Rc::new(MemoryVault::new("Notes"));
//! let mut engine = LuaEngine::new(vault);
//! engine.initialize()?;
//!
//! let result = engine.execute("return 2 + 2").await?;
//! assert_eq!(result.render().as_deref(), Some("4"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Error types and shared macros
//! - [`config`]: Configuration and logging setup
//! - [`vault`]: Host document store abstraction
//! - [`bindings`]: Host bridge installed into the VM
//! - [`scripting`]: Engine lifecycle and execution bridge

/// Error types and shared macros
pub mod core;
/// Configuration system
pub mod config;
/// Host document store abstraction
pub mod vault;
/// Host bridge exposed to scripts
pub mod bindings;
/// Engine lifecycle and execution bridge
pub mod scripting;

pub use crate::core::{BridgeError, ConsoleError, ConsoleResult};
pub use bindings::{DocumentDescriptor, HostBridge};
pub use config::ConsoleConfig;
pub use scripting::{CaptureBuffer, ExecutionResult, LuaEngine, OutputSink, ScriptValue};
pub use vault::{DocumentRef, FsVault, MemoryVault, Vault};
