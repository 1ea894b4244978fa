use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use ferry_core::client::HttpClient;
use ferry_core::service::DockerLauncher;
use ferry_core::sink::Sink;
use ferry_core::transfer::Transfer;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum FilesSubcommand {
    /// Fetch an object into a local file
    Get { hash: String, dest: PathBuf },
    /// Upload a file (or a directory, with --dir) and print the hash(es)
    Put {
        path: String,
        /// Upload every entry of a directory and record a hash manifest
        #[arg(long)]
        dir: bool,
        /// Send bytes to the alternate gateway host
        #[arg(long)]
        gateway: bool,
    },
    /// Pin an object on the local node
    Pin { hash: String },
    /// Print an object's content
    Cat { hash: String },
    /// List the links under an object
    Ls { hash: String },
    /// List objects pinned on the local node
    Pinned,
}

pub fn run(subcmd: FilesSubcommand, sink: &dyn Sink, json: bool) -> anyhow::Result<()> {
    let launcher = DockerLauncher::new();
    let client = HttpClient::new().context("failed to build network client")?;
    let transfer = Transfer::new(&launcher, &client)?;

    match subcmd {
        FilesSubcommand::Get { hash, dest } => {
            transfer
                .get(&hash, &dest, sink)
                .with_context(|| format!("failed to get '{hash}'"))?;
            if json {
                print_json(&serde_json::json!({ "hash": hash, "dest": dest }))?;
            } else {
                println!("Wrote {}", dest.display());
            }
            Ok(())
        }
        FilesSubcommand::Put { path, dir, gateway } => {
            if dir {
                let manifest = transfer
                    .put_directory(&path, gateway, sink)
                    .with_context(|| format!("failed to upload directory '{path}'"))?;
                if json {
                    let rows: Vec<_> = manifest
                        .entries
                        .iter()
                        .map(|e| serde_json::json!({ "hash": e.hash, "file": e.file_name }))
                        .collect();
                    print_json(&rows)?;
                }
                // Plain hashes are already echoed by the orchestrator.
                Ok(())
            } else {
                let hash = transfer
                    .put(Path::new(&path), gateway, sink)
                    .with_context(|| format!("failed to upload '{path}'"))?;
                if json {
                    print_json(&serde_json::json!({ "hash": hash }))?;
                } else {
                    println!("{hash}");
                }
                Ok(())
            }
        }
        FilesSubcommand::Pin { hash } => {
            let pinned = transfer
                .pin(&hash, sink)
                .with_context(|| format!("failed to pin '{hash}'"))?;
            if json {
                print_json(&serde_json::json!({ "hash": pinned }))?;
            } else {
                println!("{pinned}");
            }
            Ok(())
        }
        FilesSubcommand::Cat { hash } => {
            let content = transfer
                .cat(&hash, sink)
                .with_context(|| format!("failed to cat '{hash}'"))?;
            print!("{content}");
            Ok(())
        }
        FilesSubcommand::Ls { hash } => {
            let listing = transfer
                .ls(&hash, sink)
                .with_context(|| format!("failed to list '{hash}'"))?;
            println!("{listing}");
            Ok(())
        }
        FilesSubcommand::Pinned => {
            let listing = transfer
                .ls_pinned(sink)
                .context("failed to list pinned objects")?;
            println!("{listing}");
            Ok(())
        }
    }
}
