//! Local snapshot commands: update, increment, info, vacuum

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use etg_core::model::CardBatch;
use etg_core::source::CardSource;
use etg_engine::SnapshotUpdater;
use etg_online::{JsonFileSource, ScryfallSource};
use etg_store::query::render_value;
use etg_store::TableMerger;

use super::{Context, VersionArgs};

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: VersionArgs,

    /// Read cards from a saved bulk JSON file instead of downloading
    #[arg(long)]
    pub source_file: Option<PathBuf>,

    /// Date stamped on the price rows (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub target: VersionArgs,

    /// Rows shown per table
    #[arg(long, default_value_t = 5)]
    pub head: usize,
}

fn updater(ctx: &Context) -> SnapshotUpdater {
    SnapshotUpdater::new(ctx.store.clone(), TableMerger::for_now())
}

pub fn execute_update(args: UpdateArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on a missing target before downloading the bulk payload
    if let Some(n) = args.target.version {
        ctx.store.resolve(etg_core::ArtifactKind::Snapshot, Some(n))?;
    }

    let source: Box<dyn CardSource> = match args.source_file {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(ScryfallSource::new(ctx.config.source.bulk_url.clone())?),
    };

    println!("Fetching cards from {}...", source.describe());
    let records = source.fetch()?;
    let utc = args
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let batch = CardBatch::new(records, utc);

    let report = updater(ctx).update(&batch, args.target.version)?;
    let file = report.version.file_name(etg_core::ArtifactKind::Snapshot);
    if report.created {
        println!("Created {}", file);
    }
    println!(
        "Updated {}: {} cards, {} images, {} prices appended, {} pruned",
        file,
        report.merge.cards,
        report.merge.images,
        report.merge.prices_appended,
        report.merge.prices_pruned
    );
    Ok(())
}

pub fn execute_increment(
    args: VersionArgs,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let created = updater(ctx).increment(args.version)?;
    println!(
        "Created {}",
        created.file_name(etg_core::ArtifactKind::Snapshot)
    );
    Ok(())
}

pub fn execute_info(args: InfoArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let (version, overview) = updater(ctx).info(args.target.version, args.head)?;

    println!("{}", version.file_name(etg_core::ArtifactKind::Snapshot));
    for table in overview {
        println!();
        println!("== {} ({} rows) ==", table.table, table.row_count);
        println!("{}", table.head.columns.join("\t"));
        for row in &table.head.rows {
            let cells: Vec<String> = row.iter().map(render_value).collect();
            println!("{}", cells.join("\t"));
        }
    }
    Ok(())
}

pub fn execute_vacuum(args: VersionArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let version = updater(ctx).vacuum(args.version)?;
    println!(
        "Vacuumed {}",
        version.file_name(etg_core::ArtifactKind::Snapshot)
    );
    Ok(())
}
