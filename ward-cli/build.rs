//! Renders `ward.1` and one `ward-<command>.1` page per subcommand into
//! `$OUT_DIR/man`.
//!
//! Build scripts cannot see the crate they build, so the command tree is
//! restated here and must track `src/cli.rs`.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn global_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .global(true)
        .action(ArgAction::SetTrue)
}

fn policy_arg() -> Arg {
    Arg::new("policy")
        .long("policy")
        .value_name("POLICY")
        .help("Policy preset name or JSON policy document")
}

fn cwd_arg() -> Arg {
    Arg::new("cwd")
        .long("cwd")
        .value_name("DIR")
        .help("Working directory to resolve against")
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["text", "json"])
        .default_value("text")
        .help("Output format")
}

fn ward() -> Command {
    Command::new("ward")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect sandbox filesystem decisions")
        .arg(global_flag("verbose", "Log why operations are denied"))
        .arg(global_flag("quiet", "Print nothing but requested output"))
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .value_name("PATH")
                .env("WARD_STATE_DIR")
                .global(true)
                .help("Sandbox state directory, always protected"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Extra configuration file, merged over the defaults"),
        )
        .subcommand(
            Command::new("check")
                .about("Decide whether a filesystem operation would be allowed")
                .arg(Arg::new("operation").required(true).value_parser([
                    "create", "write", "append", "rename", "delete", "mkdir",
                ]))
                .arg(Arg::new("path").required(true))
                .arg(Arg::new("destination").help("Destination path (rename only)"))
                .arg(policy_arg())
                .arg(cwd_arg())
                .arg(
                    Arg::new("commit")
                        .long("commit")
                        .action(ArgAction::SetTrue)
                        .help("Re-check ancestry as the operation would at commit"),
                )
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("canonicalize")
                .about("Show the canonical form of a path")
                .arg(Arg::new("path").required(true))
                .arg(cwd_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("roots")
                .about("List the roots a policy resolves to")
                .arg(policy_arg())
                .arg(cwd_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a configuration file")
                .arg(Arg::new("config_path").value_name("CONFIG_PATH").required(true)),
        )
        .subcommand(Command::new("show-config").about("Print the merged configuration"))
        .subcommand(
            Command::new("completions")
                .about("Print a shell completion script")
                .arg(Arg::new("shell").required(true).value_parser([
                    "bash", "elvish", "fish", "powershell", "zsh",
                ])),
        )
}

fn render(cmd: Command, dir: &Path, name: &str) -> io::Result<()> {
    let mut page = Vec::new();
    Man::new(cmd).title(name).render(&mut page)?;
    fs::write(dir.join(format!("{name}.1")), page)
}

fn main() -> io::Result<()> {
    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::other("OUT_DIR is not set"))?;
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let ward = ward();
    for sub in ward.get_subcommands() {
        let name = format!("ward-{}", sub.get_name());
        render(sub.clone(), &man_dir, &name)?;
    }
    render(ward, &man_dir, "ward")?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
