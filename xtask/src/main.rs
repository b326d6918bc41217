use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for the physics playground")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests, docs and both drop scenarios
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, denying warnings
    Clippy,
    /// Run all tests, or only one crate's
    Test {
        /// Package to test, e.g. playground-physics
        #[arg(short, long)]
        package: Option<String>,
    },
    /// Build rustdoc for the workspace
    Doc,
    /// Run the falling-box scenario through the CLI on every backend
    Scenarios,
}

const BACKENDS: [&str; 2] = ["simple", "rigid"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test(None)?;
            doc()?;
            scenarios()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test { package } => test(package.as_deref())?,
        Commands::Doc => doc()?,
        Commands::Scenarios => scenarios()?,
    }

    Ok(())
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> {label}: cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{label} failed ({status})");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test(package: Option<&str>) -> Result<()> {
    match package {
        Some(package) => cargo("test", &["test", "-p", package]),
        None => cargo("test", &["test", "--workspace"]),
    }
}

fn doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

fn scenarios() -> Result<()> {
    for backend in BACKENDS {
        cargo(
            &format!("drop scenario ({backend})"),
            &[
                "run", "-q", "-p", "playground-cli", "--", "--backend", backend, "drop", "--json",
            ],
        )?;
    }
    Ok(())
}
