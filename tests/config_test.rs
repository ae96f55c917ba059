//! Secrets loading per backend.
//!
//! Points `HOME` at a temp dir, so this binary holds a single test.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;

use docclass::{Backend, Config, DocclassError};

#[test]
fn only_huggingface_backend_reads_secrets() {
    let home = tempfile::tempdir().unwrap();
    let secrets_dir = home.path().join(".docclass");
    std::fs::create_dir(&secrets_dir).unwrap();
    let secrets_path = secrets_dir.join("secrets.toml");
    std::fs::write(&secrets_path, "[huggingface]\napi_key = \"hf_test\"\n").unwrap();
    std::fs::set_permissions(&secrets_path, std::fs::Permissions::from_mode(0o644)).unwrap();

    // SAFETY: the only test in this binary; nothing else reads HOME concurrently.
    unsafe { std::env::set_var("HOME", home.path()) };

    let mut config = Config::default();
    config.classifier.backend = Backend::Local;
    let secrets = config.load_secrets().unwrap();
    assert!(secrets.huggingface.is_none());

    config.classifier.backend = Backend::HuggingFace;
    let err = config.load_secrets().unwrap_err();
    assert!(matches!(err, DocclassError::Configuration(_)));
    assert!(err.to_string().contains("insecure permissions"), "got {err}");

    std::fs::set_permissions(&secrets_path, std::fs::Permissions::from_mode(0o600)).unwrap();
    let secrets = config.load_secrets().unwrap();
    assert_eq!(secrets.huggingface_api_key().as_deref(), Some("hf_test"));
}
