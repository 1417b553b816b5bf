use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use verso_patch::{Patch, PatchCodec, PatchLine};
use verso_sdk::{ChangeSummary, DocumentId, VersionNumber, Versioning, VersioningConfig};
use verso_tree::{diff_documents, Change, DiffNode, DocumentDiff};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, cli.format),
        Command::Patch(args) => cmd_patch(args, cli.format),
        Command::Apply(args) => cmd_apply(args),
        Command::Replay(args) => cmd_replay(args, cli.format),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let diff = diff_documents(&read(&args.old)?, &read(&args.new)?);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff.to_tiptap_json())?),
        OutputFormat::Text => {
            print!("{}", render_diff(&diff));
            let stats = diff.stats();
            println!(
                "{} added, {} removed, {} moved, {} unchanged",
                stats.added.to_string().green(),
                stats.removed.to_string().red(),
                stats.moved.to_string().blue(),
                stats.unchanged,
            );
        }
    }
    Ok(())
}

fn cmd_patch(args: PatchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let patch = PatchCodec::new(args.context).diff(&read(&args.old)?, &read(&args.new)?);
    match format {
        OutputFormat::Json => println!("{}", patch.encode()?),
        OutputFormat::Text => print!("{}", render_patch(&patch)),
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let base = read(&args.base)?;
    let blob = read(&args.patch)?;
    let result = PatchCodec::default()
        .apply(&base, &blob)
        .with_context(|| format!("applying {} to {}", args.patch.display(), args.base.display()))?;
    print!("{result}");
    Ok(())
}

fn cmd_replay(args: ReplayArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => VersioningConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => VersioningConfig::default(),
    };
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(replay(config, &args.files, format))
}

async fn replay(config: VersioningConfig, files: &[PathBuf], format: OutputFormat) -> anyhow::Result<()> {
    let versioning = Versioning::in_memory(config)?;
    let document = DocumentId::new();

    let mut expected: Vec<(VersionNumber, String)> = Vec::new();
    for path in files {
        let content = read(path)?;
        let receipt = versioning
            .save(&document, &content, None)
            .await
            .with_context(|| format!("saving {}", path.display()))?;
        if receipt.created {
            expected.push((receipt.version_number, content));
        } else {
            tracing::info!(file = %path.display(), "unchanged, no version created");
        }
    }

    for (number, content) in &expected {
        let restored = versioning.get_version_content(&document, *number).await?;
        if &restored != content {
            bail!("version {number} does not reconstruct to the saved content");
        }
    }

    let versions = versioning.list_versions(&document).await?;
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "document": document,
                "verified": expected.len(),
                "versions": versions,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("Document {}", document.to_string().cyan());
            for entry in &versions {
                println!(
                    "  {}  {}  {}",
                    format!("v{}", entry.version_number).yellow().bold(),
                    entry.saved_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    describe(&entry.summary),
                );
            }
            println!("{} {} versions reconstruct exactly", "✓".green().bold(), expected.len());
        }
    }
    Ok(())
}

fn describe(summary: &ChangeSummary) -> String {
    match summary {
        ChangeSummary::Baseline { bytes } => format!("baseline, {bytes} bytes"),
        ChangeSummary::Delta(s) => format!(
            "delta, {} {} in {} hunk(s)",
            format!("+{}", s.additions).green(),
            format!("-{}", s.deletions).red(),
            s.hunks
        ),
    }
}

fn render_patch(patch: &Patch) -> String {
    let mut out = String::new();
    for hunk in &patch.hunks {
        let header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_start + 1,
            hunk.old_count(),
            hunk.new_start + 1,
            hunk.new_count()
        );
        out.push_str(&format!("{}\n", header.cyan()));
        for line in &hunk.lines {
            let text = line.text().trim_end_matches('\n');
            let rendered = match line {
                PatchLine::Context(_) => format!(" {text}").normal(),
                PatchLine::Delete(_) => format!("-{text}").red(),
                PatchLine::Insert(_) => format!("+{text}").green(),
            };
            out.push_str(&format!("{rendered}\n"));
        }
    }
    out
}

/// Render the merged tree one block per line, prefixed with its change.
fn render_diff(diff: &DocumentDiff) -> String {
    let mut out = String::new();
    for root in &diff.roots {
        render_node(root, &mut out);
    }
    out
}

fn render_node(node: &DiffNode, out: &mut String) {
    let children = node.children().unwrap_or_default();
    let is_textblock = children.iter().any(|c| matches!(c, DiffNode::Text { .. }));

    if let DiffNode::Text { .. } = node {
        out.push_str(&format!("{}\n", span(node)));
    } else if is_textblock {
        let line: String = children.iter().map(|c| span(c).to_string()).collect();
        out.push_str(&format!("{}{line}\n", prefix(node.change())));
    } else if children.is_empty() {
        let label = format!("[{}]", node.node_type());
        out.push_str(&format!("{}{}\n", prefix(node.change()), paint(&label, node.change())));
    } else {
        for child in children {
            render_node(child, out);
        }
    }
}

fn prefix(change: Change) -> &'static str {
    match change {
        Change::Unchanged => "  ",
        Change::Added => "+ ",
        Change::Removed => "- ",
        Change::Moved => "~ ",
    }
}

fn span(node: &DiffNode) -> colored::ColoredString {
    match node {
        DiffNode::Text { text, .. } => paint(text, node.change()),
        other => paint(&format!("[{}]", other.node_type()), other.change()),
    }
}

fn paint(text: &str, change: Change) -> colored::ColoredString {
    match change {
        Change::Unchanged => text.normal(),
        Change::Added => text.green().underline(),
        Change::Removed => text.red().strikethrough(),
        Change::Moved => text.blue(),
    }
}
