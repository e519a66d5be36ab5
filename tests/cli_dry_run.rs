// tests/cli_dry_run.rs

mod common;

use std::fs;

use samlocal::cli::{CliArgs, CliMode};
use samlocal::run;

use common::{init_tracing, Fixture};

#[tokio::test]
async fn dry_run_generates_without_spawning() {
    init_tracing();
    let fixture = Fixture::new();

    let config_path = fixture.dir.path().join("Samlocal.toml");
    fs::write(
        &config_path,
        r#"
[config]
sam_binary = "definitely-not-a-sam-binary"

[function.first]
filename = "first.zip"
handler = "handler.handler"
runtime = "nodejs14.x"
route = "/test"
"#,
    )
    .unwrap();

    let args = CliArgs {
        config: config_path.display().to_string(),
        mode: Some(CliMode::Sdk),
        log_level: None,
        dry_run: true,
    };

    // A real run would fail to spawn the missing binary.
    run(args).await.unwrap();
}

#[tokio::test]
async fn invalid_config_fails_before_generating() {
    init_tracing();
    let fixture = Fixture::new();

    let config_path = fixture.dir.path().join("Samlocal.toml");
    fs::write(&config_path, "[config]\nmode = \"api\"\n").unwrap();

    let args = CliArgs {
        config: config_path.display().to_string(),
        mode: None,
        log_level: None,
        dry_run: true,
    };

    let err = run(args).await.unwrap_err();
    assert!(err.to_string().contains("at least one"), "got {err}");
}
