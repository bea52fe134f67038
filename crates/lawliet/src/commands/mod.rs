//! Command dispatch: bridges CLI args -> Controller calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod files;
pub mod images;
pub mod progress;
pub mod recover;
pub mod util;

use lawliet_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
///
/// Status messages the controller publishes while the command runs are
/// printed to stderr once it finishes, whatever the outcome.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut notices = util::Notices::new(controller, global);

    let result = match cmd {
        Command::Images(args) => images::handle(controller, args, global).await,
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Recover(args) => {
            recover::handle(controller, args, config, global, &mut notices).await
        }
        Command::Progress(args) => progress::handle(controller, args, global).await,
        Command::Files(args) => files::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    notices.flush();
    result
}
