//! td init command implementation
//!
//! Creates the data directory, event log, and a default owner file when
//! one does not exist yet.

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: bool,
}

pub fn run(data_dir: Option<PathBuf>, json: bool, quiet: bool) -> Result<()> {
    let storage = Storage::resolve(data_dir)?;
    let already_initialized = storage.is_initialized();
    storage.init()?;

    let report = InitReport {
        data_dir: storage.data_dir().to_path_buf(),
        created: !already_initialized,
    };

    let mut human = HumanOutput::new("td initialized");
    human.push_summary("Data dir", storage.data_dir().display().to_string());
    if already_initialized {
        human.push_detail("data directory already existed; nothing to do".to_string());
    } else {
        human.push_detail("created data directory and event log".to_string());
    }

    emit_success(OutputOptions { json, quiet }, "init", &report, Some(&human))
}
