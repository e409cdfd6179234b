//! Remote commands: push, pull

use clap::Args;
use etg_engine::RemoteSync;
use etg_store::Archiver;

use super::{Context, VersionArgs};

#[derive(Debug, Args)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: VersionArgs,

    /// Remote archives to keep; overrides `remote.keep`
    #[arg(long)]
    pub keep: Option<usize>,
}

/// Size in MB as shown to the operator
fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub fn execute_push(args: PushArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let blob = ctx.blob_store()?;
    let keep = args.keep.unwrap_or(ctx.config.remote.keep);
    let sync = RemoteSync::new(Archiver::new(ctx.store.clone()), blob.as_ref(), keep)?;

    let report = sync.push(args.target.version)?;
    if report.compressed {
        println!("Compressed {} before upload", report.version);
    }
    println!("Pushed {} to {}", report.object, blob.container());
    for version in &report.deleted {
        println!("Removed remote {}", version);
    }
    Ok(())
}

pub fn execute_pull(args: VersionArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let blob = ctx.blob_store()?;
    let sync = RemoteSync::new(
        Archiver::new(ctx.store.clone()),
        blob.as_ref(),
        ctx.config.remote.keep,
    )?;

    let report = sync.pull(args.version)?;
    println!(
        "Pulled {} from {} ({:.2} MB archive, {:.2} MB snapshot)",
        report.object,
        blob.container(),
        megabytes(report.snapshot.archive_bytes),
        megabytes(report.snapshot.snapshot_bytes)
    );
    Ok(())
}
