// src/commands.rs
use crate::cli::{Cli, Command, CountArgs, DiffArgs, ExtractArgs, MergeArgs};
use crate::documents::models::{CountReport, DiffReport, ExtractReport, MergeReport};
use crate::documents::{inventory, load_document, load_optional_document, InventoryOptions};
use crate::extractors::{diff_entries, merge_missing_entries, Anchor, Delimiters, SectionExtractor, Span};
use crate::storage::{derived_file_name, StorageManager};
use crate::utils::debug::create_debug_html;
use crate::utils::error::{AppError, ExtractError};
use std::path::PathBuf;

/// Settings shared by every subcommand.
pub struct Context {
    pub extractor: SectionExtractor,
    pub output_dir: PathBuf,
    pub write_report: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            extractor: SectionExtractor::new().with_terminator_lookahead(cli.lookahead),
            output_dir: cli.output_dir.clone(),
            write_report: cli.report,
        }
    }

    /// The output directory is only created once something is written to it.
    fn storage(&self) -> Result<StorageManager, AppError> {
        Ok(StorageManager::new(&self.output_dir)?)
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let ctx = Context::from_cli(&cli);
    match &cli.command {
        Command::Count(args) => count(&ctx, args),
        Command::Diff(args) => diff(&ctx, args),
        Command::Extract(args) => extract(&ctx, args),
        Command::Merge(args) => merge(&ctx, args),
    }
}

/// Inventories each file; unbalanced documents are reported and skipped.
pub fn count(ctx: &Context, args: &CountArgs) -> Result<(), AppError> {
    let options = InventoryOptions {
        anchor: args.anchor.clone(),
        delimiters: Delimiters::new(args.open, args.close)?,
        key: args.key.clone(),
        group_by: args.group_by.clone(),
        strip_comments: !args.keep_comments,
    };

    let mut documents = Vec::new();
    let mut failure_count = 0;

    for path in &args.files {
        let Some(doc) = load_optional_document(path)? else {
            continue;
        };

        match inventory(&ctx.extractor, &doc.label(), &doc.content, &options) {
            Ok(inv) => {
                for region in &inv.regions {
                    println!("{}\t{}\t{}", inv.path, region.label, region.entry_count());
                    for (value, n) in &region.groups {
                        println!("{}\t{}\t  {}\t{}", inv.path, region.label, value, n);
                    }
                }
                for dup in &inv.duplicates {
                    tracing::warn!("\"{}\" appears {}x in {}", dup.name, dup.count, inv.path);
                }
                tracing::info!("{}: {} entries in {} region(s)", inv.path, inv.entry_count(), inv.regions.len());
                documents.push(inv);
            }
            Err(e @ ExtractError::UnbalancedRegion { .. }) => {
                tracing::error!("Skipping {}: {}", doc.label(), e);
                failure_count += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let total_entries: usize = documents.iter().map(|d| d.entry_count()).sum();
    println!("total\t{}", total_entries);
    tracing::info!("Counting finished. Documents: {}, Failures: {}", documents.len(), failure_count);

    let all_failed = documents.is_empty() && failure_count > 0;
    if ctx.write_report {
        let report = CountReport { documents, total_entries, generated_at: timestamp() };
        ctx.storage()?.save_report("count", &report)?;
    }

    if all_failed {
        return Err(AppError::Processing(format!("All {} document(s) had unbalanced regions", failure_count)));
    }

    Ok(())
}

/// Prints the source entry names that the target lacks, one per line.
pub fn diff(ctx: &Context, args: &DiffArgs) -> Result<(), AppError> {
    let source = load_document(&args.source)?;
    let target = load_document(&args.target)?;

    let options_for = |anchor: &Anchor| InventoryOptions {
        anchor: anchor.clone(),
        delimiters: Delimiters::SQUARE,
        key: args.key.clone(),
        group_by: None,
        strip_comments: !args.keep_comments,
    };

    let source_inv = inventory(&ctx.extractor, &source.label(), &source.content, &options_for(&args.source_anchor))?;
    let target_inv = inventory(&ctx.extractor, &target.label(), &target.content, &options_for(&args.target_anchor))?;

    let source_names = source_inv.names();
    let target_names = target_inv.names();
    let missing = diff_entries(&source_names, &target_names);

    for name in &missing {
        println!("{}", name);
    }
    tracing::info!(
        "{} of {} source entries missing from {} ({} entries)",
        missing.len(),
        source_names.len(),
        target_inv.path,
        target_names.len()
    );

    if ctx.write_report {
        let report = DiffReport {
            source: source_inv.path.clone(),
            target: target_inv.path.clone(),
            source_total: source_names.len(),
            target_total: target_names.len(),
            missing: missing.iter().map(|s| s.to_string()).collect(),
            generated_at: timestamp(),
        };
        ctx.storage()?.save_report("diff", &report)?;
    }

    Ok(())
}

/// Writes region text to the output directory. A missing anchor is a warning.
pub fn extract(ctx: &Context, args: &ExtractArgs) -> Result<(), AppError> {
    let doc = load_document(&args.file)?;
    let delimiters = Delimiters::new(args.open, args.close)?;

    let spans: Vec<Span> = if args.all {
        ctx.extractor.find_all_regions_from(&doc.content, &args.anchor, delimiters, args.from, args.terminator())?
    } else {
        match ctx.extractor.find_balanced_region(&doc.content, &args.anchor, delimiters, args.from, args.terminator()) {
            Ok(span) => vec![span],
            Err(ExtractError::NotFound(_)) => Vec::new(),
            Err(e) => {
                tracing::error!("Failed to extract region from {}: {}", doc.label(), e);
                return Err(e.into());
            }
        }
    };

    if spans.is_empty() {
        tracing::warn!("No region for {} in {}", args.anchor, doc.label());
        return Ok(());
    }

    let storage = ctx.storage()?;
    for (idx, span) in spans.iter().enumerate() {
        let suffix = if spans.len() == 1 { "region".to_string() } else { format!("region{}", idx + 1) };
        let output = storage.save_text(&derived_file_name(&doc.path, &suffix), span.slice(&doc.content))?;
        println!("{}..{}\t{}", span.start, span.end, output.display());

        if ctx.write_report {
            let report = ExtractReport {
                document: doc.label(),
                anchor: args.anchor.to_string(),
                span: *span,
                length: span.len(),
                output: output.display().to_string(),
                generated_at: timestamp(),
            };
            storage.save_report(&suffix_stem(&output), &report)?;
        }
    }

    if args.debug {
        let patterns: Vec<(&str, &str)> = args.highlight.iter().map(|p| (p.as_str(), "custom")).collect();
        let debug_path = storage.base_dir().join(format!("{}.html", derived_file_name(&doc.path, "annotated")));
        if let Err(e) = create_debug_html(&doc.content, &debug_path, &spans, &patterns) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }

    Ok(())
}

fn suffix_stem(output: &std::path::Path) -> String {
    output
        .file_name()
        .map(|n| n.to_string_lossy().replace('.', "_"))
        .unwrap_or_else(|| "extract".to_string())
}

/// Copies missing entries into the target region; aborts on any region error.
pub fn merge(ctx: &Context, args: &MergeArgs) -> Result<(), AppError> {
    let source = load_document(&args.source)?;
    let target = load_document(&args.target)?;

    let outcome = merge_missing_entries(
        &ctx.extractor,
        &source.content,
        &args.source_anchor,
        &target.content,
        &args.target_anchor,
        &args.key,
    )
    .map_err(|e| {
        tracing::error!("Merge of {} into {} aborted: {}", source.label(), target.label(), e);
        e
    })?;

    for name in &outcome.added {
        println!("+ {}", name);
    }
    let target_after = outcome.target_before + outcome.added.len();
    tracing::info!(
        "{}: {} entries added ({} -> {}/{})",
        target.label(),
        outcome.added.len(),
        outcome.target_before,
        target_after,
        outcome.source_total
    );

    let output = if args.dry_run || outcome.added.is_empty() {
        None
    } else if args.in_place {
        Some(ctx.storage()?.overwrite(&target.path, &outcome.text)?)
    } else {
        Some(ctx.storage()?.save_text(&derived_file_name(&target.path, "merged"), &outcome.text)?)
    };

    if ctx.write_report {
        let report = MergeReport {
            source: source.label(),
            target: target.label(),
            output: output.map(|p| p.display().to_string()),
            dry_run: args.dry_run,
            source_total: outcome.source_total,
            target_before: outcome.target_before,
            target_after,
            added: outcome.added,
            generated_at: timestamp(),
        };
        ctx.storage()?.save_report("merge", &report)?;
    }

    Ok(())
}
