// tests/file_store_gate.rs

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use blaker::clock::SystemClock;
use blaker::config::load_and_validate;
use blaker::deadline::{DeadlineKey, DeadlineSource};
use blaker::errors::BlakerError;
use blaker::exec::{Gate, GuardedExecutor};
use blaker::store::FileStore;
use blaker_test_utils::builders::captured;
use blaker_test_utils::{init_tracing, with_timeout};

fn executor_for(path: &std::path::Path, key: DeadlineKey) -> GuardedExecutor {
    let deadlines = DeadlineSource::new(Arc::new(FileStore::new(path)), key);
    GuardedExecutor::new(deadlines, Arc::new(SystemClock))
}

fn write_store(file: &mut NamedTempFile, contents: &str) {
    let f = file.as_file_mut();
    f.set_len(0).unwrap();
    use std::io::Seek;
    f.seek(std::io::SeekFrom::Start(0)).unwrap();
    write!(f, "{}", contents).unwrap();
    f.flush().unwrap();
}

#[tokio::test]
async fn editing_the_store_flips_the_gate() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write_store(&mut file, "");
    let executor = executor_for(file.path(), DeadlineKey::default());

    assert_eq!(executor.check().await.unwrap(), Gate::Allow { deadline: None });
    let run = captured("echo", &["hi"]);
    assert!(with_timeout(executor.run(run.request)).await.unwrap().success());
    assert_eq!(run.stdout.lines(), vec!["hi"]);

    write_store(
        &mut file,
        r#"
[[blaker_config]]
name = "break_time"
value = "2000-01-01T00:00:00Z"
"#,
    );

    assert!(executor.check().await.unwrap().is_skip());
    let run = captured("echo", &["hi"]);
    let status = with_timeout(executor.run(run.request)).await.unwrap();
    assert!(status.skipped());
    assert!(run.stderr.contents().contains("cannot be run after 2000-01-01T00:00:00Z"));
    assert!(run.stderr.contents().contains("`echo hi`"));
}

#[tokio::test]
async fn unreadable_store_is_store_unavailable() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let executor = executor_for(&dir.path().join("missing.toml"), DeadlineKey::default());
    let run = captured("echo", &["hi"]);

    let result = with_timeout(executor.run(run.request)).await;
    assert!(matches!(result, Err(BlakerError::StoreUnavailable { .. })), "got {:?}", result);
    assert_eq!(run.stdout.contents(), "");
}

#[tokio::test]
async fn config_file_drives_table_and_key_names() {
    init_tracing();

    let mut store = NamedTempFile::new().unwrap();
    write_store(
        &mut store,
        r#"
[[ops_gates]]
id = "cutover"
at = 2001-02-03T04:05:06Z
"#,
    );

    let mut cfg_file = NamedTempFile::new().unwrap();
    write!(
        cfg_file,
        r#"
[store]
path = "{}"
table = "ops_gates"
key_attribute = "id"
key = "cutover"
value_attribute = "at"

[run]
wait = "5s"
"#,
        store.path().display()
    )
    .unwrap();

    let cfg = load_and_validate(cfg_file.path()).unwrap();
    assert_eq!(cfg.wait, Some(Duration::from_secs(5)));
    assert_eq!(cfg.store_path.as_deref(), Some(store.path()));

    let executor = executor_for(store.path(), cfg.deadline_key.clone());
    match executor.check().await.unwrap() {
        Gate::Skip { deadline } => {
            assert_eq!(blaker::deadline::format_deadline(&deadline), "2001-02-03T04:05:06Z");
        }
        other => panic!("expected Skip, got {:?}", other),
    }
}

#[test]
fn invalid_config_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[run]
wait = "tomorrow"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(BlakerError::ConfigError(msg)) => assert!(msg.contains("[run].wait")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn malformed_config_toml_is_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[store\npath = ").unwrap();

    assert!(matches!(load_and_validate(file.path()), Err(BlakerError::TomlError(_))));
}
