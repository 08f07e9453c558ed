//! Pipeline construction from configuration.

use storyreel::{StoryreelConfig, TtsProvider, build_pipeline};

fn config_with(toml: &str) -> StoryreelConfig {
    StoryreelConfig::from_toml_str(toml).unwrap()
}

const ALL_KEYS: &str = r#"
[output]
dir = "/tmp/storyreel-wiring"

[providers.openai]
api_key = "sk-test"

[providers.replicate]
api_token = "r8-test"

[providers.elevenlabs]
api_key = "el-test"
"#;

#[test]
fn test_builds_with_all_credentials() {
    let config = config_with(ALL_KEYS);
    let pipeline = build_pipeline(&config).unwrap();
    assert_eq!(pipeline.output_dir(), config.output.dir.as_path());
    assert_eq!(pipeline.use_storyboard(), config.pipeline.use_storyboard);
}

#[test]
fn test_missing_openai_key_fails_before_any_run() {
    let mut config = config_with(ALL_KEYS);
    config.providers.openai.api_key = None;
    let err = build_pipeline(&config).unwrap_err();
    assert!(err.to_string().contains("OpenAI API key is required"));
}

#[test]
fn test_missing_replicate_token_fails() {
    let mut config = config_with(ALL_KEYS);
    config.providers.replicate.api_token = Some("  ".to_string());
    let err = build_pipeline(&config).unwrap_err();
    assert!(err.to_string().contains("Replicate API token is required"));
}

#[test]
fn test_openai_narration_does_not_need_elevenlabs_key() {
    let mut config = config_with(ALL_KEYS);
    config.providers.elevenlabs.api_key = None;
    assert!(build_pipeline(&config).is_err());

    config.audio.provider = TtsProvider::OpenAi;
    assert!(build_pipeline(&config).is_ok());
}

#[test]
fn test_storyboard_flag_is_carried() {
    let mut config = config_with(ALL_KEYS);
    config.pipeline.use_storyboard = false;
    let pipeline = build_pipeline(&config).unwrap();
    assert!(!pipeline.use_storyboard());
}

#[test]
fn test_credential_fallbacks_feed_wiring() {
    let mut config = config_with("[output]\ndir = \"/tmp/storyreel-wiring\"\n");
    assert!(build_pipeline(&config).is_err());

    config.apply_credential_fallbacks(|name| match name {
        "OPENAI_API_KEY" => Some("sk-env".to_string()),
        "REPLICATE_API_TOKEN" => Some("r8-env".to_string()),
        "ELEVENLABS_API_KEY" => Some("el-env".to_string()),
        _ => None,
    });
    assert!(build_pipeline(&config).is_ok());
}
