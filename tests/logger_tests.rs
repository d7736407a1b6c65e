use tempfile::TempDir;
use watchplan::utils::logger::init_logging;

#[test]
fn test_logging_initializes_once_and_is_idempotent() {
    let log_dir = TempDir::new().unwrap();

    init_logging(Some(log_dir.path())).unwrap();
    // a second call must be a no-op, not a panic or double-init error
    init_logging(None).unwrap();
    init_logging(Some(log_dir.path())).unwrap();

    tracing::info!(target: "app::rotation", "logger smoke test");
}
