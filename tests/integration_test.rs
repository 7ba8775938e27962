use lua_console::config::EngineConfig;
use lua_console::{ConsoleError, ExecutionResult, LuaEngine, MemoryVault, ScriptValue};
use proptest::prelude::*;
use std::rc::Rc;

fn vault() -> Rc<MemoryVault> {
    let vault = Rc::new(MemoryVault::new("Notes"));
    vault.insert("Untitled.md", "# Untitled\n\nfirst draft\n");
    vault.insert(
        "projects/Plan.md",
        "---\ntitle: Plan\ntags: [work, q3]\n---\n# Plan\n",
    );
    vault
}

fn ready_engine() -> (Rc<MemoryVault>, LuaEngine) {
    let vault = vault();
    let mut engine = LuaEngine::new(vault.clone());
    engine.initialize().unwrap();
    (vault, engine)
}

fn output(text: &str) -> ExecutionResult {
    ExecutionResult::Output(text.to_string())
}

#[tokio::test]
async fn test_prints_are_joined_by_newlines() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("print('a'); print('b')").await.unwrap();
    assert_eq!(result, output("a\nb"));
}

#[tokio::test]
async fn test_return_value_when_nothing_printed() {
    let (_vault, mut engine) = ready_engine();

    let result = engine.execute("return 2+2").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(4)));

    let result = engine.execute("2 + 2").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(4)));

    let result = engine.execute("return 'text'").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("text")));
}

#[tokio::test]
async fn test_statements_without_value_yield_nil() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("local x = 1").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));
    assert_eq!(result.render(), None);
}

#[tokio::test]
async fn test_printed_text_wins_over_return_value() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("print('shown') return 42").await.unwrap();
    assert_eq!(result, output("shown"));
}

#[tokio::test]
async fn test_whitespace_only_output_falls_back_to_value() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("print('   ') return 7").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(7)));
}

#[tokio::test]
async fn test_capture_buffer_is_cleared_between_executions() {
    let (_vault, mut engine) = ready_engine();
    engine.execute("print('first')").await.unwrap();
    let result = engine.execute("return 1").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(1)));
}

#[tokio::test]
async fn test_structured_values_are_returned_as_is() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("return { 1, 2, 3 }").await.unwrap();
    assert_eq!(
        result,
        ExecutionResult::Value(ScriptValue::Array(vec![
            ScriptValue::Integer(1),
            ScriptValue::Integer(2),
            ScriptValue::Integer(3),
        ]))
    );
}

#[tokio::test]
async fn test_error_is_execution_error() {
    let (_vault, mut engine) = ready_engine();
    let err = engine.execute("error('boom')").await.unwrap_err();
    match err {
        ConsoleError::Execution { message } => assert!(message.contains("boom")),
        other => panic!("unexpected error: {:?}", other),
    }

    // 执行失败后引擎仍然可用
    let result = engine.execute("return 1").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(1)));
}

#[tokio::test]
async fn test_error_table_uses_message_field() -> anyhow::Result<()> {
    let (_vault, mut engine) = ready_engine();
    let err = engine
        .execute("error({ message = 'tbl', code = 7 })")
        .await
        .expect_err("error table should fail the execution");
    assert_eq!(err.message(), Some("tbl"));

    let err = engine
        .execute("error({ code = 7 })")
        .await
        .expect_err("error table should fail the execution");
    assert!(err.message().is_some_and(|m| m.starts_with("table:")));

    // 脚本内的 pcall 仍能拿到原始错误对象
    let result = engine
        .execute("local ok, e = pcall(error, { message = 'inner' }) return e.message")
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("inner")));
    Ok(())
}

#[tokio::test]
async fn test_error_table_raised_after_host_read() -> anyhow::Result<()> {
    let (_vault, mut engine) = ready_engine();
    let err = engine
        .execute("local text = getNoteContent('Untitled') error({ message = #text })")
        .await
        .expect_err("error table should fail the execution");
    assert_eq!(err.message(), Some("24"));
    Ok(())
}

#[tokio::test]
async fn test_error_discards_partial_output() {
    let (_vault, mut engine) = ready_engine();
    assert!(engine.execute("print('partial') error('late')").await.is_err());

    let result = engine.execute("return nil").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));
}

#[tokio::test]
async fn test_execute_before_initialize_fails() {
    let mut engine = LuaEngine::new(vault());
    let err = engine.execute("return 1").await.unwrap_err();
    assert!(matches!(err, ConsoleError::NotInitialized));
}

#[tokio::test]
async fn test_execute_after_cleanup_fails() {
    let (_vault, mut engine) = ready_engine();
    engine.execute("return 1").await.unwrap();
    engine.cleanup();

    let err = engine.execute("return 1").await.unwrap_err();
    assert!(matches!(err, ConsoleError::NotInitialized));

    engine.initialize().unwrap();
    assert!(engine.execute("return 1").await.is_ok());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let (_vault, mut engine) = ready_engine();
    engine.execute("counter = 41").await.unwrap();

    engine.initialize().unwrap();

    let result = engine.execute("return counter + 1").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(42)));
}

#[tokio::test]
async fn test_reset_gives_fresh_state() {
    let (_vault, mut engine) = ready_engine();
    engine.execute("counter = 1; app = nil; print('stale')").await.unwrap();

    engine.reset().unwrap();
    assert!(engine.is_initialized());

    let result = engine.execute("return counter").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));

    let result = engine.execute("return type(app)").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("table")));
}

#[tokio::test]
async fn test_initialize_failure_leaves_engine_uninitialized() {
    let config = EngineConfig {
        memory_limit: Some(1),
        ..Default::default()
    };
    let mut engine = LuaEngine::with_config(vault(), config);

    let err = engine.initialize().unwrap_err();
    assert!(matches!(err, ConsoleError::Initialization(_)));
    assert!(!engine.is_initialized());
    assert!(matches!(
        engine.execute("return 1").await,
        Err(ConsoleError::NotInitialized)
    ));

    engine.set_config(EngineConfig::default());
    engine.initialize().unwrap();
    assert!(engine.is_initialized());
}

#[tokio::test]
async fn test_reset_failure_leaves_engine_uninitialized() {
    let (_vault, mut engine) = ready_engine();
    engine.set_config(EngineConfig {
        memory_limit: Some(1),
        ..Default::default()
    });

    assert!(matches!(engine.reset(), Err(ConsoleError::Initialization(_))));
    assert!(!engine.is_initialized());
}

#[tokio::test]
async fn test_get_note_content_by_basename() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("return getNoteContent('Untitled')").await.unwrap();
    assert_eq!(
        result,
        ExecutionResult::Value(ScriptValue::from("# Untitled\n\nfirst draft\n"))
    );
}

#[tokio::test]
async fn test_note_descriptor_fields() {
    let (_vault, mut engine) = ready_engine();
    let result = engine
        .execute(
            "local n = Note('projects/Plan.md')\n\
             print(n.path, n.name, n.basename, n.extension)",
        )
        .await
        .unwrap();
    assert_eq!(result, output("projects/Plan.md\tPlan.md\tPlan\tmd"));
}

#[tokio::test]
async fn test_missing_note_surfaces_as_execution_error() {
    let (_vault, mut engine) = ready_engine();
    let err = engine.execute("return Note('missing-file')").await.unwrap_err();
    match err {
        ConsoleError::Execution { message } => assert!(message.contains("missing-file")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_note_can_be_caught_by_script() {
    let (_vault, mut engine) = ready_engine();
    let result = engine
        .execute("local ok = pcall(Note, 'missing-file') return ok")
        .await
        .unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Boolean(false)));
}

#[tokio::test]
async fn test_host_reads_settle_before_execute_returns() {
    let (_vault, mut engine) = ready_engine();
    let result = engine
        .execute(
            "local total = 0\n\
             for _, f in ipairs(app.getAllFiles()) do\n\
               total = total + #getNoteContent(f.path)\n\
             end\n\
             return total",
        )
        .await
        .unwrap();

    let expected = "# Untitled\n\nfirst draft\n".len()
        + "---\ntitle: Plan\ntags: [work, q3]\n---\n# Plan\n".len();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(expected as i64)));
}

#[tokio::test]
async fn test_app_reflects_live_vault_state() {
    let (vault, mut engine) = ready_engine();

    let result = engine.execute("return app.getActiveFile()").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));

    vault.insert("Later.md", "later");
    vault.set_active(Some("Later.md"));

    let result = engine
        .execute("return #app.getAllFiles() .. ' ' .. app.getActiveFile().basename")
        .await
        .unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("3 Later")));

    let result = engine
        .execute("return app.getAllFiles()[1].content == nil")
        .await
        .unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Boolean(true)));
}

#[tokio::test]
async fn test_frontmatter_from_note() {
    let (_vault, mut engine) = ready_engine();
    let result = engine
        .execute(
            "local fm = app.getFrontmatter(getNoteContent('Plan'))\n\
             return fm.title .. ':' .. fm.tags[2]",
        )
        .await
        .unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("Plan:q3")));

    let result = engine
        .execute("return app.getFrontmatter(getNoteContent('Untitled'))")
        .await
        .unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));
}

#[tokio::test]
async fn test_parse_yaml_error_is_execution_error() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("return app.parseYaml('n: 5').n").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(5)));

    let err = engine.execute("return app.parseYaml('a: [1')").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Execution { .. }));
}

#[tokio::test]
async fn test_log_passes_value_through() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("return log(21) * 2").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(42)));
}

#[tokio::test]
async fn test_vault_name_and_banner() {
    let (_vault, mut engine) = ready_engine();
    let result = engine.execute("return app.getName()").await.unwrap();
    assert_eq!(result, ExecutionResult::Value(ScriptValue::from("Notes")));

    let result = engine.execute("print(_lua_console.header)").await.unwrap();
    assert_eq!(result.as_output(), Some(engine.banner().unwrap().as_str()));
}

proptest! {
    #[test]
    fn prop_single_print_returns_trimmed_text(text in "[a-zA-Z0-9 ]{0,24}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (_vault, mut engine) = ready_engine();

        let result = runtime
            .block_on(engine.execute(&format!("print('{}')", text)))
            .unwrap();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            prop_assert_eq!(result, ExecutionResult::Value(ScriptValue::Nil));
        } else {
            prop_assert_eq!(result, ExecutionResult::Output(trimmed.to_string()));
        }
    }

    #[test]
    fn prop_scalar_return_is_unchanged(n in -1_000_000_000i64..1_000_000_000i64) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (_vault, mut engine) = ready_engine();

        let result = runtime.block_on(engine.execute(&format!("return {}", n))).unwrap();
        prop_assert_eq!(result, ExecutionResult::Value(ScriptValue::Integer(n)));
    }
}
