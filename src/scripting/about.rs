use mlua::Lua;

/// 控制台版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 控制台简介
pub const ABOUT: &str = "Lua scripting console for your vault. The vault is available as \"app\".";

/// 版本命名空间在 VM 中的全局名
pub const NAMESPACE: &str = "_lua_console";

/// 组装横幅：VM 版本、控制台版本、简介，各占一行
pub fn banner(lua_version: &str) -> String {
    format!("{}\nLua Console v{}\n{}", lua_version, VERSION, ABOUT)
}

/// 安装 `_lua_console = { version, about, header }`
pub fn install_namespace(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();
    let lua_version: String = globals.get("_VERSION")?;

    let namespace = lua.create_table()?;
    namespace.set("version", VERSION)?;
    namespace.set("about", ABOUT)?;
    namespace.set("header", banner(&lua_version))?;
    globals.set(NAMESPACE, namespace)
}
