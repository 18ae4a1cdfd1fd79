#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use url::Url;

pub const POOL_ID: &str = "us-east-1_LocalPool";
pub const CLIENT_ID: &str = "local-client";

/// An isolated HOME plus a local file pool.
pub struct Sandbox {
    _dir: TempDir,
    pub home: PathBuf,
    pub pool: PathBuf,
    pub endpoint: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let pool = dir.path().join("pool");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&pool).unwrap();
        let endpoint = file_pool_url(&pool);
        Self {
            _dir: dir,
            home,
            pool,
            endpoint,
        }
    }

    /// Run the CLI against this sandbox's pool.
    pub fn run(&self, args: &[&str]) -> Output {
        run_cli_with_env(args, &self.home, &self.endpoint)
    }

    /// Run the CLI and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure, returning stderr.
    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if output.status.success() {
            panic!("CLI command should have failed: {:?}", args);
        }
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn session_file(&self) -> PathBuf {
        self.home.join("data").join("authkit").join("session.json")
    }
}

pub fn file_pool_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// Run the CLI binary with a custom HOME for isolated session storage.
pub fn run_cli_with_env(args: &[&str], home: &Path, endpoint: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authkit"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("NO_COLOR", "1");
    cmd.env("AUTHKIT_ENDPOINT", endpoint);
    cmd.env("AUTHKIT_USER_POOL_ID", POOL_ID);
    cmd.env("AUTHKIT_CLIENT_ID", CLIENT_ID);
    cmd.env_remove("AUTHKIT_REGION");
    cmd.env_remove("AUTHKIT_CLIENT_SECRET");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}
