//! Check command implementation.
//!
//! Decides one operation against the configured policy on the host
//! filesystem and reports the verdict. A denied operation exits with
//! status 1, so the command can gate scripts.

use crate::error::CliError;
use crate::utils::{load_configuration, open_sandbox, print_json, resolve_cwd, GlobalOptions, OutputFormat};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use ward::engine::{Decision, Operation, OperationKind};
use ward::path::OsProbe;
use ward::AccessDenied;

/// Decide whether a filesystem operation would be allowed.
#[derive(Args)]
pub struct CheckCommand {
    /// Operation kind (create, write, append, rename, delete, mkdir)
    #[arg(value_name = "OPERATION")]
    pub operation: OperationKind,

    /// Target path, absolute or relative to the working directory
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Destination path (rename only)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<String>,

    /// Policy preset name or JSON policy document
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Working directory to decide against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Also run the commit-time re-check on an allowed verdict
    #[arg(long)]
    pub commit: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    operation: &'a str,
    decision: &'a str,
    reason: Option<&'a str>,
    target: Option<String>,
    destination: Option<String>,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let op = self.operation()?;

        let config = load_configuration(global, self.policy.as_deref())?;
        let cwd = resolve_cwd(self.cwd)?;
        let probe = OsProbe::new();
        let sandbox = open_sandbox(&config, &cwd, &probe)?;

        let verdict = sandbox.check(&op);
        let mut decision = verdict.decision();
        if self.commit && decision.is_allow() {
            if let Err(denied) = sandbox.commit(&op, &verdict) {
                decision = Decision::Deny(denied.reason);
            }
        }

        let target = verdict.target().map(ToString::to_string);
        let destination = verdict.destination().map(ToString::to_string);

        match self.format {
            OutputFormat::Json => print_json(&CheckReport {
                operation: op.kind().as_str(),
                decision: if decision.is_allow() { "allow" } else { "deny" },
                reason: decision.reason().map(|r| r.code()),
                target: target.clone(),
                destination: destination.clone(),
            })?,
            OutputFormat::Text if !global.quiet => {
                let shown = target.as_deref().unwrap_or(op.target());
                match &destination {
                    Some(dest) => println!("{decision}: {} {shown} -> {dest}", op.kind()),
                    None => println!("{decision}: {} {shown}", op.kind()),
                }
            }
            OutputFormat::Text => {}
        }

        match decision.reason() {
            None => Ok(()),
            Some(reason) => Err(CliError::Denied(AccessDenied::new(
                reason,
                target.unwrap_or_else(|| op.target().to_string()),
            ))),
        }
    }

    fn operation(&self) -> Result<Operation, CliError> {
        let op = Operation::new(self.operation, self.path.clone());
        match (self.operation, &self.destination) {
            (OperationKind::Rename, Some(dest)) => Ok(op.with_destination(dest.clone())),
            (OperationKind::Rename, None) => Err(CliError::InvalidArguments(
                "rename requires a DESTINATION".to_string(),
            )),
            (_, Some(_)) => Err(CliError::InvalidArguments(format!(
                "{} does not take a DESTINATION",
                self.operation
            ))),
            (_, None) => Ok(op),
        }
    }
}
