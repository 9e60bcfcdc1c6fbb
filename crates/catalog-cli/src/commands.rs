use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use catalog_revision::{BatchMissPolicy, DeleteOutcome, RevisionService};
use catalog_store::{BucketRepository, InMemoryCatalogStore};
use catalog_types::{Bucket, CatalogObjectMetadata, CatalogObjectRevision, Page};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());
    let session = Session::open(&store_path, &config)?;
    let format = cli.format;

    match cli.command {
        Command::Buckets => {
            let buckets = session.buckets()?;
            emit(format, &buckets, || print_buckets(&buckets))
        }
        Command::Push(args) => {
            let meta = session.push(&args)?;
            emit(format, &meta, || print_created(&meta))
        }
        Command::Get(args) => {
            let revision = session.get(&args)?;
            if let Some(output) = &args.output {
                fs::write(output, &revision.payload)
                    .with_context(|| format!("writing {}", output.display()))?;
                println!("{} wrote {} bytes to {}", "✓".green(), revision.payload.len(), output.display());
                return Ok(());
            }
            emit(format, &revision.metadata(), || print_revision(&revision))
        }
        Command::List(args) => {
            let page = session.list(&args)?;
            let page = page.map(|rev| rev.metadata());
            emit(format, &page, || print_page(&page))
        }
        Command::Delete(args) => {
            let outcome = session.delete(&args)?;
            emit(format, &outcome, || print_deleted(&outcome))
        }
        Command::Batch(args) => {
            let found = session.batch(&args)?;
            let found: Vec<_> = found.iter().map(CatalogObjectRevision::metadata).collect();
            emit(format, &found, || {
                for meta in &found {
                    print_metadata_line(meta);
                }
            })
        }
    }
}

/// A store loaded from its snapshot file, wired to a revision engine.
///
/// Mutating commands write the snapshot back before returning.
pub struct Session {
    store: Arc<InMemoryCatalogStore>,
    service: RevisionService,
    store_path: PathBuf,
}

impl Session {
    pub fn open(store_path: &Path, config: &CliConfig) -> anyhow::Result<Self> {
        let store = InMemoryCatalogStore::load_from(store_path)
            .with_context(|| format!("loading store {}", store_path.display()))?;
        for bucket in &config.buckets {
            store.insert_bucket(bucket.clone())?;
        }
        let store = Arc::new(store);
        let service = RevisionService::from_store(store.clone())
            .with_parser(config.payload_format.parser())
            .with_config(config.service.clone());
        debug!(path = %store_path.display(), "catalog store opened");
        Ok(Self {
            store,
            service,
            store_path: store_path.to_path_buf(),
        })
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.store
            .save_to(&self.store_path)
            .with_context(|| format!("saving store {}", self.store_path.display()))
    }

    pub fn buckets(&self) -> anyhow::Result<Vec<Bucket>> {
        Ok(self.store.list_buckets()?)
    }

    pub fn push(&self, args: &PushArgs) -> anyhow::Result<CatalogObjectMetadata> {
        let raw = fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
        let meta = self.service.create_revision_from_payload(
            args.bucket,
            args.object,
            raw,
            args.layout.clone(),
        )?;
        self.persist()?;
        Ok(meta)
    }

    pub fn get(&self, args: &GetArgs) -> anyhow::Result<CatalogObjectRevision> {
        Ok(self.service.get_object(
            args.bucket,
            args.object,
            args.revision,
            args.representation.as_deref(),
        )?)
    }

    pub fn list(&self, args: &ListArgs) -> anyhow::Result<Page<CatalogObjectRevision>> {
        let page = self.service.config().page_or_default(args.page, args.size);
        Ok(self
            .service
            .list_objects(args.bucket, args.object, args.filter.as_deref(), &page)?)
    }

    pub fn delete(&self, args: &DeleteArgs) -> anyhow::Result<DeleteOutcome> {
        let outcome = self.service.delete(args.bucket, args.object, args.revision)?;
        self.persist()?;
        Ok(outcome)
    }

    pub fn batch(&self, args: &BatchArgs) -> anyhow::Result<Vec<CatalogObjectRevision>> {
        if args.fail_fast && self.service.config().batch_miss_policy != BatchMissPolicy::FailFast {
            let mut config = self.service.config().clone();
            config.batch_miss_policy = BatchMissPolicy::FailFast;
            let strict = RevisionService::from_store(self.store.clone()).with_config(config);
            return Ok(strict.get_objects_revisions(args.bucket, &args.objects)?);
        }
        Ok(self.service.get_objects_revisions(args.bucket, &args.objects)?)
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

fn print_buckets(buckets: &[Bucket]) {
    if buckets.is_empty() {
        println!("No buckets configured.");
    }
    for bucket in buckets {
        println!("{}  {}  ({})", bucket.id.to_string().yellow().bold(), bucket.name.bold(), bucket.owner.dimmed());
    }
}

fn print_created(meta: &CatalogObjectMetadata) {
    println!(
        "{} Created revision {} of object {}",
        "✓".green().bold(),
        meta.revision_id.to_string().yellow(),
        meta.object_id.to_string().yellow().bold()
    );
    println!("  Name: {}", meta.name);
    println!("  Project: {}", meta.project_name);
}

fn print_metadata_line(meta: &CatalogObjectMetadata) {
    println!(
        "{}/{}  {}  {}  {}",
        meta.object_id.to_string().yellow().bold(),
        meta.revision_id.to_string().yellow(),
        meta.kind.cyan(),
        meta.name.bold(),
        meta.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
}

fn print_revision(revision: &CatalogObjectRevision) {
    print_metadata_line(&revision.metadata());
    println!("  Project: {}", revision.project_name);
    if let Some(layout) = &revision.layout {
        println!("  Layout: {}", layout.dimmed());
    }
    for kv in &revision.key_values {
        println!("  {}{} = {}", kv.label.prefix().dimmed(), kv.key, kv.value);
    }
    println!();
    println!("{}", String::from_utf8_lossy(&revision.payload));
}

fn print_page(page: &Page<CatalogObjectMetadata>) {
    if page.is_empty() {
        println!("No revisions.");
        return;
    }
    for meta in &page.items {
        print_metadata_line(meta);
    }
    println!(
        "{}",
        format!(
            "page {}/{} ({} total)",
            page.page + 1,
            page.total_pages().max(1),
            page.total_elements
        )
        .dimmed()
    );
}

fn print_deleted(outcome: &DeleteOutcome) {
    match outcome {
        DeleteOutcome::ObjectDeleted { object_id, revision_id } => println!(
            "{} Deleted object {} with its last revision {}",
            "✓".green().bold(),
            object_id.to_string().yellow().bold(),
            revision_id
        ),
        DeleteOutcome::RevisionDeleted {
            object_id,
            revision_id,
            last_revision_id,
        } => println!(
            "{} Deleted revision {} of object {} (latest is now {})",
            "✓".green().bold(),
            revision_id.to_string().yellow(),
            object_id.to_string().yellow().bold(),
            last_revision_id
        ),
    }
}
