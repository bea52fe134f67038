//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use lawliet_core::{BlockDevice, Controller};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Mounted At")]
    mountpoint: String,
}

impl From<&Arc<BlockDevice>> for DeviceRow {
    fn from(d: &Arc<BlockDevice>) -> Self {
        Self {
            path: d.path.clone(),
            size: d.size_human.clone(),
            model: d.model.clone(),
            mountpoint: d.mountpoint.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { unmounted } => {
            let snap = controller.refresh_devices().await?;
            let devices: Vec<Arc<BlockDevice>> = snap
                .iter()
                .filter(|d| !unmounted || !d.is_mounted())
                .cloned()
                .collect();

            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.path.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
