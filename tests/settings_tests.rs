// Tests for the persisted settings document: round trips, write-on-mutation,
// and forward compatibility of the on-disk schema.

use loqa_dictate::settings::{
    PolishProvider, Settings, SettingsStore, Style, TranscriptionProvider,
};
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("settings.json")
}

#[test]
fn missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::load(store_path(&dir)).unwrap();

    assert_eq!(store.settings(), &Settings::default());
    assert_eq!(store.settings().current_style, Style::Casual);
    assert_eq!(
        store.settings().transcription_provider,
        TranscriptionProvider::Groq
    );
    assert!(store.settings().show_in_menu_bar);
    assert_eq!(store.settings().silence_threshold, 3);
}

#[test]
fn every_mutation_persists() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    {
        let mut store = SettingsStore::load(&path).unwrap();
        store.set_style(Style::Formal).unwrap();
        store.set_polish_provider(PolishProvider::Gemini).unwrap();
        store.set_launch_at_login(true).unwrap();
        store.set_silence_threshold(7).unwrap();
        store.set_app_style("com.example.mail", Style::Formal).unwrap();
    }

    let reloaded = SettingsStore::load(&path).unwrap();
    let settings = reloaded.settings();
    assert_eq!(settings.current_style, Style::Formal);
    assert_eq!(settings.polish_provider, PolishProvider::Gemini);
    assert!(settings.launch_at_login);
    assert_eq!(settings.silence_threshold, 7);
    assert_eq!(
        settings.app_styles.get("com.example.mail"),
        Some(&Style::Formal)
    );
}

#[test]
fn unknown_keys_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::write(
        &path,
        r#"{
            "currentStyle": "formal",
            "playSounds": false,
            "someFutureKnob": {"nested": true}
        }"#,
    )
    .unwrap();

    let store = SettingsStore::load(&path).unwrap();
    assert_eq!(store.settings().current_style, Style::Formal);
    assert!(!store.settings().play_sounds);
}

#[test]
fn missing_keys_take_defaults() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, r#"{"silenceThreshold": 10}"#).unwrap();

    let store = SettingsStore::load(&path).unwrap();
    assert_eq!(store.settings().silence_threshold, 10);
    assert_eq!(store.settings().current_style, Style::Casual);
    assert!(store.settings().play_sounds);
    assert!(store.settings().app_styles.is_empty());
}

#[test]
fn malformed_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, "{ definitely not json").unwrap();

    assert!(SettingsStore::load(&path).is_err());
}

#[test]
fn app_style_falls_back_to_current_style() {
    let mut settings = Settings::default();
    settings.current_style = Style::ExtremelyCasual;
    settings
        .app_styles
        .insert("com.example.slack".to_string(), Style::Casual);

    assert_eq!(settings.style_for_app("com.example.slack"), Style::Casual);
    assert_eq!(
        settings.style_for_app("com.example.editor"),
        Style::ExtremelyCasual
    );
}

#[test]
fn document_uses_the_wire_field_names() {
    let json = serde_json::to_string(&Settings::default()).unwrap();
    for key in [
        "currentStyle",
        "transcriptionProvider",
        "polishProvider",
        "launchAtLogin",
        "showInMenuBar",
        "playSounds",
        "silenceThreshold",
        "appStyles",
    ] {
        assert!(json.contains(key), "missing key {}", key);
    }
    assert!(json.contains("\"casual\""));
    assert!(json.contains("\"groq\""));
}
