mod common;

use base64::Engine;
use predicates::prelude::*;

use common::Sandbox;

// ─── Status ─────────────────────────────────────────────────────

#[test]
fn status_without_credentials() {
    let sb = Sandbox::new();

    sb.asc()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Credential storage: Config File"))
        .stdout(predicate::str::contains("No credentials stored"))
        .stderr(predicate::str::contains("Keychain bypassed"));
}

#[test]
fn status_lists_profiles_with_default_marker() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");
    sb.login("client", "KEY2");
    let config = sb.global_config();

    sb.asc()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("personal (Key ID: KEY1) (stored in config: "))
        .stdout(predicate::str::contains("client (Key ID: KEY2) (default)"))
        .stdout(predicate::str::contains(config.to_str().unwrap()));
}

#[test]
fn status_verbose_shows_fingerprints() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");

    sb.asc()
        .args(["auth", "status", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keychain available: false"))
        .stdout(predicate::str::contains("Fingerprint: "));
}

#[test]
fn status_notes_ignored_env_when_profile_selected() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");

    sb.asc()
        .args(["--profile", "personal", "auth", "status"])
        .env("ASC_KEY_ID", "ENVKEY")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Profile \"personal\" selected; environment credentials will be ignored.",
        ));
}

#[test]
fn status_notes_incomplete_env() {
    let sb = Sandbox::new();

    sb.asc()
        .args(["auth", "status"])
        .env("ASC_KEY_ID", "ENVKEY")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment credentials are incomplete"));
}

#[test]
fn status_reports_broken_config() {
    let sb = Sandbox::new();
    std::fs::create_dir_all(sb.global_config().parent().unwrap()).unwrap();
    std::fs::write(sb.global_config(), "{invalid").unwrap();

    sb.asc()
        .args(["auth", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn unknown_switch_value_warns() {
    let sb = Sandbox::new();

    sb.asc()
        .args(["auth", "status"])
        .env("ASC_STRICT_AUTH", "maybe")
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid ASC_STRICT_AUTH value \"maybe\""));
}

// ─── Validate ───────────────────────────────────────────────────

#[test]
fn validate_default_profile() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");

    sb.asc()
        .args(["auth", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"profile\":\"personal\""))
        .stdout(predicate::str::contains("\"key_id\":\"KEY1\""))
        .stdout(predicate::str::contains("\"source\":\"config\""))
        .stdout(predicate::str::contains("\"fingerprint\":\""))
        .stdout(predicate::str::contains("\"valid\":true"));
}

#[test]
fn profile_flag_wins_over_env_profile() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");
    sb.login("client", "KEY2");

    sb.asc()
        .args(["auth", "validate"])
        .env("ASC_PROFILE", "personal")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key_id\":\"KEY1\""));

    sb.asc()
        .args(["--profile", "client", "auth", "validate"])
        .env("ASC_PROFILE", "personal")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key_id\":\"KEY2\""));
}

#[test]
fn validate_missing_profile_reports_invalid() {
    let sb = Sandbox::new();
    sb.login("personal", "KEY1");
    let key = sb.write_key("env.p8");

    sb.asc()
        .args(["--profile", "missing", "auth", "validate"])
        .env("ASC_KEY_ID", "ENVKEY")
        .env("ASC_ISSUER_ID", "ENVISS")
        .env("ASC_PRIVATE_KEY_PATH", &key)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\":false"))
        .stderr(predicate::str::contains("Credential 'missing' not found"));
}

#[test]
fn validate_env_only_base64_key_cleans_up_staged_file() {
    let sb = Sandbox::new();
    let key = sb.write_key("env.p8");
    let encoded = base64::engine::general_purpose::STANDARD.encode(std::fs::read(&key).unwrap());

    sb.asc()
        .args(["auth", "validate"])
        .env("ASC_KEY_ID", "ENVKEY")
        .env("ASC_ISSUER_ID", "ENVISS")
        .env("ASC_PRIVATE_KEY_B64", encoded)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key_id\":\"ENVKEY\""))
        .stdout(predicate::str::contains("\"source\":\"env\""))
        .stdout(predicate::str::contains("\"valid\":true"));

    let staging = sb.tmp().join("asc-keys");
    let leftovers = std::fs::read_dir(&staging)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[test]
fn validate_without_any_credentials_fails() {
    let sb = Sandbox::new();

    sb.asc()
        .args(["auth", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\":false"))
        .stderr(predicate::str::contains("No credentials configured"));
}

fn write_profile_without_key(sb: &Sandbox) {
    std::fs::create_dir_all(sb.global_config().parent().unwrap()).unwrap();
    std::fs::write(
        sb.global_config(),
        r#"{"defaultKeyName":"ci","keys":[{"name":"ci","keyId":"CIKEY","issuerId":"CIISS"}]}"#,
    )
    .unwrap();
}

#[test]
fn mixed_sources_warn_by_default() {
    let sb = Sandbox::new();
    write_profile_without_key(&sb);
    let key = sb.write_key("env.p8");

    sb.asc()
        .args(["auth", "validate"])
        .env("ASC_PRIVATE_KEY_PATH", &key)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key_id\":\"CIKEY\""))
        .stderr(predicate::str::contains("multiple sources"));
}

#[test]
fn strict_auth_rejects_mixed_sources() {
    let sb = Sandbox::new();
    write_profile_without_key(&sb);
    let key = sb.write_key("env.p8");

    sb.asc()
        .args(["--strict-auth", "auth", "validate"])
        .env("ASC_PRIVATE_KEY_PATH", &key)
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple sources"));

    sb.asc()
        .args(["auth", "validate"])
        .env("ASC_STRICT_AUTH", "y")
        .env("ASC_PRIVATE_KEY_PATH", &key)
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple sources"));
}
