//! Host process tests

use hearth::Runtime;
use hearth::host::{HostOptions, ensure_clean, resolve_heartbeat, run};
use hearth_domain::ConstructionState;
use std::io::Write;

#[tokio::test(flavor = "multi_thread")]
async fn test_host_check_mode_starts_and_stops() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[logging]\nlevel = \"warn\"\n\n[components.heartbeat]\ninterval_secs = 1"
    )
    .unwrap();

    let report = run(HostOptions {
        config_path: Some(file.path().to_path_buf()),
        check: true,
    })
    .await
    .unwrap();

    assert_eq!(report.stopped, 2);
    assert!(ensure_clean(&report).is_ok());
}

#[tokio::test]
async fn test_heartbeat_resolved_on_blocking_pool() {
    let runtime = Runtime::builder().with_registered_units().build().unwrap();
    let starting = runtime.clone();
    tokio::task::spawn_blocking(move || starting.start())
        .await
        .unwrap()
        .unwrap();

    let heartbeat = resolve_heartbeat(&runtime).await.unwrap().unwrap();
    assert_eq!(heartbeat.beats(), 0);
    let state = runtime
        .components()
        .into_iter()
        .find(|info| info.contract.ends_with("Heartbeat"))
        .and_then(|info| info.state);
    assert_eq!(state, Some(ConstructionState::Ready));

    let stopping = runtime.clone();
    let report = tokio::task::spawn_blocking(move || stopping.stop())
        .await
        .unwrap()
        .unwrap();
    assert!(report.is_clean());
}
