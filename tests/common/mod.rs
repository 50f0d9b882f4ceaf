#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use p256::pkcs8::{EncodePrivateKey, LineEnding};

/// Variables that must not leak in from the developer's environment.
const ASC_VARS: &[&str] = &[
    "ASC_PROFILE",
    "ASC_BYPASS_KEYCHAIN",
    "ASC_STRICT_AUTH",
    "ASC_KEY_ID",
    "ASC_ISSUER_ID",
    "ASC_PRIVATE_KEY_PATH",
    "ASC_PRIVATE_KEY_B64",
    "ASC_PRIVATE_KEY",
    "ASC_CONFIG_PATH",
    "ASC_LOG",
];

/// Isolated home, working and temp directories for one test.
///
/// Every command runs with the keychain bypassed so the host keychain is
/// never touched.
pub struct Sandbox {
    pub root: assert_fs::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = assert_fs::TempDir::new().unwrap();
        for dir in ["home", "work", "tmp"] {
            root.child(dir).create_dir_all().unwrap();
        }
        Self { root }
    }

    pub fn home(&self) -> PathBuf {
        self.root.child("home").path().to_path_buf()
    }

    pub fn work(&self) -> PathBuf {
        self.root.child("work").path().to_path_buf()
    }

    pub fn tmp(&self) -> PathBuf {
        self.root.child("tmp").path().to_path_buf()
    }

    pub fn global_config(&self) -> PathBuf {
        self.home().join(".asc").join("config.json")
    }

    /// Run asc inside the sandbox.
    pub fn asc(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("asc");
        for var in ASC_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.work())
            .env("HOME", self.home())
            .env("TMPDIR", self.tmp())
            .env("NO_COLOR", "1")
            .env("ASC_BYPASS_KEYCHAIN", "1");
        cmd
    }

    /// Write a fresh PKCS#8 P-256 key with owner-only permissions.
    pub fn write_key(&self, name: &str) -> PathBuf {
        let key = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();
        let child = self.root.child(name);
        child.write_str(&pem).unwrap();
        set_mode(child.path(), 0o600);
        child.path().to_path_buf()
    }

    /// Store a profile through `asc auth login`.
    pub fn login(&self, name: &str, key_id: &str) -> PathBuf {
        let key = self.write_key(&format!("{name}.p8"));
        self.asc()
            .args(["auth", "login", "--bypass-keychain", "--name", name])
            .args(["--key-id", key_id, "--issuer-id", "ISSUER"])
            .arg("--private-key")
            .arg(&key)
            .assert()
            .success();
        key
    }

    pub fn read_global_config(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.global_config()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

#[cfg(unix)]
pub fn set_mode(path: &std::path::Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(not(unix))]
pub fn set_mode(_path: &std::path::Path, _mode: u32) {}
