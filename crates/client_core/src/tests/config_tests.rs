use super::*;

use std::{
    collections::HashMap,
    env,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let seq = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = env::temp_dir().join(format!("phishguard_config_test_{suffix}_{seq}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("phishguard.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn normalizes_trailing_slashes() {
    assert_eq!(
        normalize_base_url("http://10.0.2.2:8000/").expect("valid"),
        "http://10.0.2.2:8000"
    );
    assert_eq!(
        normalize_base_url(" https://phishguard.example/api// ").expect("valid"),
        "https://phishguard.example/api"
    );
}

#[test]
fn rejects_non_http_base_urls() {
    for raw in ["ftp://example.com", "not a url", "http://example.com/?x=1"] {
        match normalize_base_url(raw) {
            Err(ClientError::InvalidBaseUrl { url, .. }) => assert_eq!(url, raw),
            other => panic!("expected invalid base url for {raw}, got {other:?}"),
        }
    }
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let path = temp_settings_file(
        "base_url = \"http://192.168.1.5:8000/\"\nrequest_timeout_secs = 5\n",
    );

    let settings = load_settings_with_env(Some(&path), no_env).expect("settings");
    assert_eq!(settings.base_url, "http://192.168.1.5:8000");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(5)));

    let overrides: HashMap<&str, &str> = HashMap::from([
        ("PHISHGUARD_BASE_URL", "http://10.0.2.2:8000"),
        ("APP__REQUEST_TIMEOUT_SECS", "0"),
    ]);
    let settings = load_settings_with_env(Some(&path), |key| {
        overrides.get(key).map(|v| v.to_string())
    })
    .expect("settings");
    assert_eq!(settings.base_url, "http://10.0.2.2:8000");
    assert_eq!(settings.request_timeout(), None);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn ignores_non_numeric_timeout_override() {
    let path = temp_settings_file("");
    let settings = load_settings_with_env(Some(&path), |key| {
        (key == "PHISHGUARD_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
    })
    .expect("settings");
    assert_eq!(settings, Settings::default());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let path = env::temp_dir().join("phishguard_config_test_missing/phishguard.toml");
    match load_settings_with_env(Some(&path), no_env) {
        Err(ClientError::Settings { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected settings error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_settings_file("base_url = [");
    assert!(matches!(
        load_settings_with_env(Some(&path), no_env),
        Err(ClientError::Settings { .. })
    ));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
