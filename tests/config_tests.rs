// Integration tests for harness configuration loading.

use anyhow::Result;
use stt_harness::{Config, StimulusMode};
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("harness.toml");
    std::fs::write(&path, body).expect("write config");
    path.to_str().expect("utf-8 path").to_owned()
}

#[test]
fn test_load_full_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[engine]
command = "speech-helper"
args = ["--model", "base"]
ready_timeout_secs = 8.0

[runner]
start_settle_secs = 1.5

[stimulus]
mode = "command"
command = "say"

[[scenarios]]
name = "Counting 1-10"
stimulus_text = "one two three four five six seven eight nine ten"
speech_rate = 120

[[scenarios]]
name = "Short Word"
stimulus_text = "hello"
"#,
    );

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.engine.command, "speech-helper");
    assert_eq!(cfg.engine.args, vec!["--model".to_owned(), "base".to_owned()]);
    assert_eq!(cfg.engine.ready_timeout_secs, 8.0);
    // Unspecified fields fall back to defaults.
    assert_eq!(cfg.engine.stop_grace_secs, 5.0);
    assert_eq!(cfg.runner.start_settle_secs, 1.5);
    assert_eq!(cfg.runner.stop_settle_secs, 1.0);
    assert_eq!(cfg.stimulus.mode, StimulusMode::Command);

    assert_eq!(cfg.scenarios.len(), 2);
    assert_eq!(cfg.scenarios[0].speech_rate, 120);
    assert_eq!(cfg.scenarios[1].speech_rate, 140, "default speech rate");
    assert_eq!(cfg.scenarios[1].post_wait_secs, 3.0, "default settle wait");
    Ok(())
}

#[test]
fn test_minimal_config_uses_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[engine]
command = "speech-helper"
"#,
    );

    let cfg = Config::load(&path)?;
    assert_eq!(cfg.stimulus.mode, StimulusMode::Speak);
    assert!(cfg.scenarios.is_empty());
    Ok(())
}

#[test]
fn test_missing_config_file_fails() {
    assert!(Config::load("/nonexistent/config/harness").is_err());
}
