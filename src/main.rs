use lua_console::config::{init_logging, ConsoleConfig};
use lua_console::{ConsoleError, FsVault, LuaEngine};
use std::path::PathBuf;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const PROMPT: &str = "lua> ";

/// 控制台命令
enum Command<'a> {
    Quit,
    Reset,
    Clear,
    Run(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let code = line.trim();
    match code {
        "" => None,
        ":quit" | ":q" => Some(Command::Quit),
        ":reset" => Some(Command::Reset),
        ":clear" => Some(Command::Clear),
        _ => Some(Command::Run(code)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Lua console failed to start: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ConsoleConfig::load_or_default();
    config.apply_env_overrides();
    if let Some(root) = std::env::args().nth(1) {
        config.vault.root = PathBuf::from(root);
    }
    config.validate()?;
    init_logging(&config.logging);

    let vault = Rc::new(FsVault::new(&config.vault.root));
    vault.set_active(config.vault.active.as_deref());
    tracing::info!(target: "lua_console", "Opening console on {:?}", vault.root());

    let mut engine = LuaEngine::with_config(vault, config.engine.clone());
    engine.initialize()?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n", engine.banner()?).as_bytes()).await?;
    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match parse_command(&line) {
            None => continue,
            Some(Command::Quit) => break,
            Some(Command::Clear) => "Output cleared.".to_string(),
            Some(Command::Reset) => match engine.reset() {
                Ok(()) => "Lua session reset. New VM initialized.".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            Some(Command::Run(code)) => match engine.execute(code).await {
                Ok(result) => match result.render() {
                    Some(text) => text,
                    None => continue,
                },
                Err(ConsoleError::NotInitialized) => {
                    "Error: Lua engine not initialized, use :reset".to_string()
                }
                Err(e) => format!("Error: {}", e),
            },
        };
        stdout.write_all(format!("{}\n", output).as_bytes()).await?;
    }

    engine.cleanup();
    Ok(())
}
