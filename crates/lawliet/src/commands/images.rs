//! Image command handlers.

use std::sync::Arc;

use tabled::Tabled;

use lawliet_core::{Controller, CoreError, StoredImage, UploadPhase};

use crate::cli::{GlobalOpts, ImagesArgs, ImagesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

const UPLOAD_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
}

impl From<&Arc<StoredImage>> for ImageRow {
    fn from(image: &Arc<StoredImage>) -> Self {
        Self {
            name: image.name.clone(),
            size: image.size_human.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ImagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ImagesCommand::List => {
            let images = controller.refresh_images().await?;
            let out = output::render_list(
                &global.output,
                images.as_slice(),
                |i| ImageRow::from(i),
                |i| i.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ImagesCommand::Upload { path } => {
            let bar = util::progress_bar(0, UPLOAD_TEMPLATE, global.quiet);
            if let Some(name) = path.file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }

            let mut updates = controller.uploads().subscribe();
            let follower = {
                let bar = bar.clone();
                tokio::spawn(async move {
                    while let Some(state) = updates.changed().await {
                        if state.phase != UploadPhase::Uploading {
                            break;
                        }
                        bar.set_length(state.bytes_total);
                        bar.set_position(state.bytes_sent);
                    }
                })
            };

            let result = controller.upload_image(&path).await;
            follower.abort();

            let outcome = match result {
                Ok(outcome) => {
                    bar.finish_and_clear();
                    outcome
                }
                Err(e) => {
                    bar.abandon();
                    return Err(e.into());
                }
            };

            let stored = outcome
                .filename
                .clone()
                .unwrap_or_else(|| path.display().to_string());
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| {
                    let size = o
                        .size
                        .map_or_else(|| "-".into(), |s| bytesize::ByteSize::b(s).to_string());
                    format!("Stored as: {stored}\nSize:      {size}")
                },
                |_| stored.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ImagesCommand::Delete { name } => {
            if !util::confirm(&format!("Delete image '{name}'?"), "images delete", global.yes)? {
                return Ok(());
            }
            controller.delete_image(&name).await.map_err(|e| match e {
                CoreError::NotFound { .. } => CliError::NotFound {
                    resource_type: "Image".into(),
                    identifier: name.clone(),
                    list_command: "images list".into(),
                },
                other => other.into(),
            })
        }
    }
}
