use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hotwords-console", version, about = "Hotwords analysis dashboard")]
pub(crate) struct Args {
    /// Optional toml config file; built-in defaults apply without one.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Backend base URL; overrides the config file.
    #[arg(long)]
    pub(crate) backend: Option<String>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}
