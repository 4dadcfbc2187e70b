//! Integration tests for Shellsync

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::fs;

    fn shellsync() -> Command {
        Command::cargo_bin("shellsync").unwrap()
    }

    /// Write a config pointing all state into the given temp dir
    fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
        let config_path = dir.join("config.toml");
        let store_root = dir.join("store");
        let manifest_path = dir.join("shell-manifest.json");
        fs::write(
            &config_path,
            format!(
                r#"
[app]
origin = "http://127.0.0.1:1"
manifest = "{}"

[store]
root = "{}"
"#,
                manifest_path.display(),
                store_root.display()
            ),
        )
        .unwrap();
        config_path
    }

    #[test]
    fn help_displays() {
        shellsync()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline app-shell cache synchronizer"));
    }

    #[test]
    fn version_displays() {
        shellsync()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shellsync"));
    }

    #[test]
    fn config_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        shellsync()
            .args(["--config", config_path.to_str().unwrap(), "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        shellsync()
            .args(["--config", config_path.to_str().unwrap(), "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("http://127.0.0.1:1"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "not = [valid").unwrap();

        shellsync()
            .args(["--config", config_path.to_str().unwrap(), "status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn status_reports_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());

        shellsync()
            .args(["--config", config_path.to_str().unwrap(), "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache entries"));
    }

    #[test]
    fn manifest_generates_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let deploy = dir.path().join("deploy");
        fs::create_dir(&deploy).unwrap();
        fs::write(deploy.join("index.html"), "<html></html>").unwrap();
        fs::write(deploy.join("main.js"), "console.log(1)").unwrap();
        let out = dir.path().join("out.json");

        shellsync()
            .args([
                "--config",
                config_path.to_str().unwrap(),
                "manifest",
                deploy.to_str().unwrap(),
                "-o",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("3 resource checksums"));

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("index.html"));
        assert!(written.contains("main.js"));
        assert!(written.contains("\"/\""));
    }

    #[test]
    fn fetch_requires_a_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());

        shellsync()
            .args([
                "--config",
                config_path.to_str().unwrap(),
                "fetch",
                "main.js",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Manifest file not found"));
    }

    #[test]
    fn fetch_passes_through_unknown_resources() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        // Manifest without the requested resource: no network is touched
        fs::write(
            dir.path().join("shell-manifest.json"),
            r#"{"index.html": "abc"}"#,
        )
        .unwrap();

        shellsync()
            .args([
                "--config",
                config_path.to_str().unwrap(),
                "fetch",
                "unknown.js",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("passes through"));
    }
}
