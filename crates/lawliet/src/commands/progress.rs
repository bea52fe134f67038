//! One-shot progress lookup for a named server operation.

use lawliet_core::{Controller, CoreError, Operation};

use crate::cli::{GlobalOpts, ProgressArgs};
use crate::error::CliError;
use crate::output;

fn detail(op: &Operation) -> String {
    let mut lines = vec![
        format!("Operation: {}", op.name),
        format!("Status:    {}", op.status),
        format!("Progress:  {}%", op.progress),
    ];
    if !op.message.is_empty() {
        lines.push(format!("Message:   {}", op.message));
    }
    lines.join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: ProgressArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let op = controller
        .operation(&args.operation)
        .await
        .map_err(|e| match e {
            CoreError::NotFound { .. } => CliError::NotFound {
                resource_type: "Operation".into(),
                identifier: args.operation.clone(),
                list_command: "progress file_recovery".into(),
            },
            other => other.into(),
        })?;

    let out = output::render_single(&global.output, &op, detail, |o| o.status.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
