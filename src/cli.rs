use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "klv",
    version,
    about = "Browse namespaces, pods, containers and their logs from the terminal."
)]
pub struct CliArgs {
    /// Namespace to open pods for on startup
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Write tracing output to this file instead of discarding it
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
