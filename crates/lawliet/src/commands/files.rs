//! Recovered-file command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use lawliet_core::{Controller, CoreError, Filter, FilterState, RecoveredFile};

use crate::cli::{FilesArgs, FilesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    format: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&Arc<RecoveredFile>> for FileRow {
    fn from(f: &Arc<RecoveredFile>) -> Self {
        Self {
            name: f.name.clone(),
            format: f.format.clone(),
            size: f.size_human.clone(),
            source: f.source.clone().unwrap_or_else(|| "-".into()),
            path: f.path.clone(),
        }
    }
}

/// Distinct formats and sources, for building filters.
#[derive(Serialize)]
struct Facets {
    formats: Vec<String>,
    sources: Vec<String>,
}

fn facets_detail(f: &Facets) -> String {
    let list = |v: &[String]| {
        if v.is_empty() {
            "-".to_owned()
        } else {
            v.join(", ")
        }
    };
    format!("Formats: {}\nSources: {}", list(&f.formats), list(&f.sources))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: FilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FilesCommand::List { file_type, source } => {
            let catalog = controller.catalog();
            catalog.set_filters(FilterState::new(
                file_type.parse::<Filter>().unwrap_or_default(),
                source.parse::<Filter>().unwrap_or_default(),
            ));
            let view = controller.refresh_catalog().await?;
            tracing::debug!(
                total = view.total(),
                visible = view.visible_count(),
                "catalog refreshed"
            );

            let out = output::render_list(
                &global.output,
                view.visible.as_slice(),
                |f| FileRow::from(f),
                |f| f.path.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FilesCommand::Facets => {
            controller.refresh_catalog().await?;
            let catalog = controller.catalog();
            let facets = Facets {
                formats: catalog.formats(),
                sources: catalog.sources(),
            };
            let out = output::render_single(&global.output, &facets, facets_detail, |f| {
                f.formats.join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FilesCommand::Download { path, dest } => {
            let bytes = controller.download(&path).await.map_err(|e| match e {
                CoreError::NotFound { .. } => CliError::NotFound {
                    resource_type: "Recovered file".into(),
                    identifier: path.clone(),
                    list_command: "files list".into(),
                },
                other => other.into(),
            })?;

            let target = destination(&path, dest.as_deref());
            tokio::fs::write(&target, &bytes)
                .await
                .map_err(|e| CliError::LocalFile {
                    path: target.display().to_string(),
                    reason: e.to_string(),
                })?;

            tracing::info!(path = %path, dest = %target.display(), bytes = bytes.len(), "downloaded");
            output::print_output(&target.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

/// Where a download lands: `dest` itself, a file named like the remote
/// one inside `dest` when it is a directory, or the remote file name in
/// the working directory.
fn destination(remote: &str, dest: Option<&Path>) -> PathBuf {
    let file_name = remote.rsplit('/').next().unwrap_or(remote);
    match dest {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(file) => file.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
