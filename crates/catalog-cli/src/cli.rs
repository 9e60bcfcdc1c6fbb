use std::path::PathBuf;

use catalog_types::{BucketId, CatalogObjectId, RevisionId};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Catalog revision service: versioned storage for workflow definitions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./catalog.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding `store_path` from the configuration
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List known buckets
    Buckets,
    /// Upload a payload as a new object or a new revision of an object
    Push(PushArgs),
    /// Show a revision (the most recent unless one is named)
    Get(GetArgs),
    /// List objects of a bucket, or the history of one object
    List(ListArgs),
    /// Delete a revision; deleting the only revision deletes the object
    Delete(DeleteArgs),
    /// Most recent revision of several objects at once
    Batch(BatchArgs),
}

#[derive(Args)]
pub struct PushArgs {
    pub bucket: BucketId,
    /// Workflow payload file, XML or JSON
    pub file: PathBuf,
    /// Append to this object instead of creating a new one
    #[arg(short, long)]
    pub object: Option<CatalogObjectId>,
    /// Editor layout stored alongside the revision
    #[arg(long)]
    pub layout: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub bucket: BucketId,
    pub object: CatalogObjectId,
    #[arg(short, long)]
    pub revision: Option<RevisionId>,
    /// Payload representation: raw, xml or json
    #[arg(long)]
    pub representation: Option<String>,
    /// Write the payload to a file instead of printing metadata
    #[arg(short = 'O', long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    pub bucket: BucketId,
    /// List this object's history instead of the bucket's latest revisions
    #[arg(short, long)]
    pub object: Option<CatalogObjectId>,
    /// Filter expression, e.g. `kind=workflow AND gi.owner=ops`
    #[arg(short, long)]
    pub filter: Option<String>,
    #[arg(long)]
    pub page: Option<usize>,
    #[arg(long)]
    pub size: Option<usize>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub bucket: BucketId,
    pub object: CatalogObjectId,
    #[arg(short, long)]
    pub revision: Option<RevisionId>,
}

#[derive(Args)]
pub struct BatchArgs {
    pub bucket: BucketId,
    #[arg(required = true)]
    pub objects: Vec<CatalogObjectId>,
    /// Abort on the first unknown object instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,
}
