//! Recovery job handler: select a source, submit, follow progress.

use lawliet_core::{
    BlockDevice, Controller, CoreError, JobPhase, JobState, SourceMode, SourceSelection,
};

use crate::cli::{GlobalOpts, RecoverArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::{self, Notices};

const JOB_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}";

pub async fn handle(
    controller: &Controller,
    args: RecoverArgs,
    cfg: &Config,
    global: &GlobalOpts,
    notices: &mut Notices,
) -> Result<(), CliError> {
    let selection = build_selection(controller, &args).await?;
    let buffer_mb = config::buffer_size(args.buffer_size, cfg);

    if let Some(source) = selection.describe() {
        tracing::info!(source = source.label(), size = source.size_human(), "carving");
    }

    let ack = controller.submit_recovery(&selection, buffer_mb).await?;
    notices.flush();

    if args.detach {
        let state = controller.job().state();
        let out = output::render_single(&global.output, &state, detail, |_| ack.operation.clone())?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let state = follow(controller, global).await?;
    let out = output::render_single(&global.output, &state, detail, phase_label)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Source selection ────────────────────────────────────────────────

/// Refresh the listings the chosen source depends on and drive a
/// `SourceSelection` the way an interactive user would.
async fn build_selection(
    controller: &Controller,
    args: &RecoverArgs,
) -> Result<SourceSelection, CliError> {
    if let Some(name) = &args.image {
        let images = controller.refresh_images().await?;
        if !images.iter().any(|i| &i.name == name) {
            return Err(CliError::NotFound {
                resource_type: "Image".into(),
                identifier: name.clone(),
                list_command: "images list".into(),
            });
        }
        let mut selection = controller.selection();
        selection.switch_mode(SourceMode::Image);
        selection.select_image(name);
        return Ok(selection);
    }

    if let Some(path) = &args.device {
        controller.refresh_devices().await?;
        let mut selection = controller.selection();
        selection.switch_mode(SourceMode::Device);
        selection.select_device(path)?;
        return Ok(selection);
    }

    // A typed path bypasses discovery, but a failed scan should not block it.
    let path = args.device_path.as_deref().unwrap_or_default();
    if let Err(e) = controller.refresh_devices().await {
        tracing::debug!(error = %e, "device scan failed; using the typed path as-is");
    }
    let mut selection = controller.selection();
    selection.switch_mode(SourceMode::Device);
    selection.set_manual_path(path);
    if let Some(mountpoint) = mounted_at(selection.devices(), selection.manual_path()) {
        return Err(CliError::MountedDevice {
            path: selection.manual_path().to_owned(),
            mountpoint,
        });
    }
    Ok(selection)
}

fn mounted_at(devices: &[BlockDevice], path: &str) -> Option<String> {
    devices
        .iter()
        .find(|d| d.path == path)
        .and_then(|d| d.mountpoint.clone())
}

// ── Progress ────────────────────────────────────────────────────────

/// Show a progress bar until the job settles. Ctrl-C stops following;
/// the service keeps carving.
async fn follow(controller: &Controller, global: &GlobalOpts) -> Result<JobState, CliError> {
    let job = controller.job();
    let bar = util::progress_bar(100, JOB_TEMPLATE, global.quiet);

    let mut updates = job.subscribe();
    let follower = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while let Some(state) = updates.changed().await {
                bar.set_position(u64::from(state.progress));
                bar.set_message(state.message);
                if !state.phase.is_busy() {
                    break;
                }
            }
        })
    };

    let result = tokio::select! {
        result = job.wait_for_terminal() => result,
        _ = tokio::signal::ctrl_c() => {
            job.cancel();
            Err(CoreError::Cancelled { operation: lawliet_core::FILE_RECOVERY.into() })
        }
    };
    follower.abort();

    match result {
        Ok(state) => {
            bar.set_position(u64::from(state.progress));
            bar.finish_and_clear();
            Ok(state)
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn phase_label(state: &JobState) -> String {
    match &state.phase {
        JobPhase::Idle => "idle".into(),
        JobPhase::Submitting => "submitting".into(),
        JobPhase::Running => "running".into(),
        JobPhase::Completed => "completed".into(),
        JobPhase::Failed { .. } => "failed".into(),
    }
}

fn detail(state: &JobState) -> String {
    let mut lines = vec![
        format!("Status:   {}", phase_label(state)),
        format!("Progress: {}%", state.progress),
    ];
    if !state.message.is_empty() {
        lines.push(format!("Message:  {}", state.message));
    }
    if state.phase == JobPhase::Completed {
        lines.push("Browse the results with: lawliet files list".into());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(path: &str, mountpoint: Option<&str>) -> BlockDevice {
        BlockDevice {
            path: path.into(),
            size_human: "14.9G".into(),
            model: "Unknown".into(),
            mountpoint: mountpoint.map(Into::into),
        }
    }

    #[test]
    fn mounted_at_only_matches_exact_paths() {
        let devices = vec![device("/dev/sda", Some("/")), device("/dev/sdb", None)];
        assert_eq!(mounted_at(&devices, "/dev/sda").as_deref(), Some("/"));
        assert_eq!(mounted_at(&devices, "/dev/sdb"), None);
        assert_eq!(mounted_at(&devices, "/dev/sda1"), None);
    }

    #[test]
    fn completed_detail_points_at_files() {
        let state = JobState {
            phase: JobPhase::Completed,
            status: None,
            progress: 100,
            message: "Recovered 12 files".into(),
        };
        let text = detail(&state);
        assert!(text.contains("Status:   completed"));
        assert!(text.contains("Recovered 12 files"));
        assert!(text.contains("lawliet files list"));
    }
}
