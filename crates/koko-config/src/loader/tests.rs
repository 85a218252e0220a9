use super::LayeredConfigOptions;
use crate::KokoConfig;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn load_from_str_accepts_json5_comments() {
    let config = KokoConfig::load_from_str(
        r#"{
            // local overrides
            server: { port: 8080 },
            model: { name: "gpt-4o-mini" },
        }"#,
    )
    .expect("load");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.model.name, "gpt-4o-mini");
    assert_eq!(config.model.max_tokens, 500);
}

#[test]
fn later_layers_override_earlier_ones() {
    let root = tempdir().expect("root");
    let user_path = root.path().join("user.json5");
    let runtime_path = root.path().join("runtime.json5");
    fs::write(
        &user_path,
        r#"{ server: { port: 6000 }, model: { name: "gpt-4.1" } }"#,
    )
    .expect("write user");
    fs::write(&runtime_path, r#"{ server: { port: 7000 } }"#).expect("write runtime");

    let cwd = root.path().join("project");
    fs::create_dir_all(&cwd).expect("cwd");
    let options = LayeredConfigOptions {
        cwd,
        system_config_path: None,
        user_config_path: Some(user_path),
        runtime_paths: vec![runtime_path],
    };
    let layered = KokoConfig::load_layered_with_options(options).expect("load");

    assert_eq!(layered.layers.len(), 2);
    assert_eq!(layered.config.server.port, 7000);
    assert_eq!(layered.config.model.name, "gpt-4.1");
}

#[test]
fn cwd_layer_is_discovered() {
    let root = tempdir().expect("root");
    fs::write(
        root.path().join("koko.json5"),
        r#"{ conversation: { max_messages: 10 } }"#,
    )
    .expect("write cwd layer");

    let options = LayeredConfigOptions {
        cwd: root.path().to_path_buf(),
        system_config_path: None,
        user_config_path: None,
        runtime_paths: Vec::new(),
    };
    let layered = KokoConfig::load_layered_with_options(options).expect("load");
    assert_eq!(layered.config.conversation.max_messages, 10);
}

#[test]
fn validate_rejects_degenerate_limits() {
    let err = KokoConfig::load_from_str(r#"{ conversation: { max_messages: 1 } }"#)
        .expect_err("too small");
    assert!(err.to_string().contains("max_messages"));

    let err =
        KokoConfig::load_from_str(r#"{ streaming: { chunk_chars: 0 } }"#).expect_err("zero chunk");
    assert!(err.to_string().contains("chunk_chars"));
}
