#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::PathBuf;

use ipcbus_core::protocol::contract::ConfigReload;
use ipcbus_messenger::app_state::AppState;
use ipcbus_messenger::config::IpcBusConfig;

fn temp_config(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ipcbus-{}-{name}.yaml", std::process::id()));
    fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn builtin_reload_is_registered() {
    let (state, _rx) = AppState::new(IpcBusConfig::default(), "/nonexistent/ipcbus.yaml");
    assert_eq!(state.messenger().registered_types(), ["config/reload"]);
}

#[tokio::test]
async fn config_reload_applies_error_replies() {
    let path = temp_config("reload", "version: 1\n");
    let (state, mut rx) = AppState::new(IpcBusConfig::default(), &path);
    assert!(state.messenger().error_replies());

    fs::write(&path, "version: 1\nmessenger:\n  error_replies: false\n").unwrap();
    let out = state.messenger().invoke::<ConfigReload>(()).await.unwrap();
    assert_eq!(out, Some(()));
    assert!(!state.messenger().error_replies());
    assert!(!state.cfg().await.messenger.error_replies);
    assert!(rx.try_recv().is_err());

    fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn invalid_reload_keeps_previous_config() {
    let path = temp_config("invalid", "version: 1\n");
    let (state, _rx) = AppState::new(IpcBusConfig::default(), &path);

    fs::write(&path, "version: 9\n").unwrap();
    let err = state.messenger().invoke::<ConfigReload>(()).await.unwrap_err();
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
    assert!(state.messenger().error_replies());
    assert_eq!(state.cfg().await.version, 1);

    fs::remove_file(&path).unwrap();
}
