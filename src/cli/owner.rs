//! td owner command implementations.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::owner;
use crate::storage::Storage;

pub struct SetOptions {
    pub name: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub owner: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct OwnerOutput {
    owner: String,
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let storage = Storage::resolve(options.data_dir)?;
    storage.init()?;
    owner::persist_owner(&storage, &options.name)?;

    let output = OwnerOutput {
        owner: options.name.trim().to_string(),
    };
    let mut human = HumanOutput::new("Owner set");
    human.push_summary("Owner", output.owner.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "owner set",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let storage = Storage::resolve(options.data_dir)?;
    let config = Config::load(&storage.config_file())?;
    let resolved = owner::resolve_owner(&storage, &config, options.owner.as_deref())?;

    let output = OwnerOutput { owner: resolved };
    let mut human = HumanOutput::new("Owner");
    human.push_summary("Owner", output.owner.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "owner show",
        &output,
        Some(&human),
    )
}
