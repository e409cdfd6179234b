//! Archive commands: zip, unzip

use etg_engine::{snapshot_unzip, snapshot_zip};
use etg_store::Archiver;

use super::{Context, VersionArgs};

pub fn execute_zip(args: VersionArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let report = snapshot_zip(&Archiver::new(ctx.store.clone()), args.version)?;
    println!(
        "Compressed {} to {} ({} -> {} bytes)",
        report.version,
        report.path.display(),
        report.snapshot_bytes,
        report.archive_bytes
    );
    Ok(())
}

pub fn execute_unzip(args: VersionArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let report = snapshot_unzip(&Archiver::new(ctx.store.clone()), args.version)?;
    println!(
        "Decompressed {} to {} ({} bytes)",
        report.version,
        report.path.display(),
        report.snapshot_bytes
    );
    Ok(())
}
