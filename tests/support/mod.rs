use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated data directory for one CLI test.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("td")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(self.data_dir())?;
        let path = self.data_dir().join("config.toml");
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

/// A td command pointed at the test home, with a fixed owner.
pub fn td_cmd(home: &TestHome, owner: &str) -> Command {
    let mut cmd = Command::cargo_bin("td").expect("td binary");
    cmd.env("TD_DATA_DIR", home.data_dir());
    cmd.env("TD_OWNER", owner);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A td command with no owner resolution besides the data dir.
pub fn td_cmd_ownerless(home: &TestHome) -> Command {
    let mut cmd = Command::cargo_bin("td").expect("td binary");
    cmd.env("TD_DATA_DIR", home.data_dir());
    cmd.env_remove("TD_OWNER");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Parse the JSON envelope from a command's stdout.
pub fn parse_envelope(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("valid JSON envelope")
}
