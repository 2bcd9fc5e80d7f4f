use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let pairs: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| pairs.get(key).cloned()
}

#[test]
fn defaults_validate() {
    let settings = ChatSettings::default();
    let url = settings.validate().expect("defaults are valid");
    assert_eq!(url.as_str(), "http://localhost:5000/api/chat");
}

#[test]
fn file_overrides_only_present_keys() {
    let mut settings = ChatSettings::default();
    apply_file_overrides(
        &mut settings,
        "api_url = \"https://chat.example.com/api/chat\"\ngreeting = \"hey\"\n",
        Path::new("chat.toml"),
    )
    .expect("parse");

    assert_eq!(settings.api_url, "https://chat.example.com/api/chat");
    assert_eq!(settings.greeting, "hey");
    assert_eq!(settings.error_text, ChatSettings::default().error_text);
}

#[test]
fn malformed_file_is_reported() {
    let mut settings = ChatSettings::default();
    let err = apply_file_overrides(&mut settings, "api_url = ", Path::new("chat.toml"))
        .expect_err("must fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let mut settings = ChatSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("CHAT_API_URL", "http://short.example/api/chat"),
            ("APP__API_URL", "http://app.example/api/chat"),
            ("CHAT_ERROR_TEXT", "offline"),
        ]),
    );

    assert_eq!(settings.api_url, "http://app.example/api/chat");
    assert_eq!(settings.error_text, "offline");
    assert_eq!(settings.greeting, ChatSettings::default().greeting);
}

#[test]
fn rejects_relative_and_non_http_urls() {
    let relative = ChatSettings {
        api_url: "/api/chat".into(),
        ..ChatSettings::default()
    };
    assert!(matches!(
        relative.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));

    let ftp = ChatSettings {
        api_url: "ftp://localhost/api/chat".into(),
        ..ChatSettings::default()
    };
    assert!(matches!(
        ftp.validate(),
        Err(ConfigError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}

#[test]
fn rejects_blank_texts() {
    let settings = ChatSettings {
        error_text: "  ".into(),
        ..ChatSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::Empty("error_text"))
    ));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("jokester_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("load");
    settings.validate().expect("valid");
}

#[test]
fn loads_settings_from_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("jokester_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("chat.toml");
    fs::write(&path, "error_text = \"server is napping\"\n").expect("write config");

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.error_text, "server is napping");

    fs::remove_dir_all(temp_root).expect("cleanup");
}
