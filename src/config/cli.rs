use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the pagecopy binary.
#[derive(Debug, Parser)]
#[command(
    name = "pagecopy",
    version,
    about = "Read, edit and sanitize CMS page copy"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "PAGECOPY_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the content store connection URL.
    #[arg(long = "redis-url", value_name = "URL", global = true)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the current snapshot, or a single page, as JSON.
    Show(ShowArgs),
    /// Write sections of one page and print the page as the cache now sees it.
    Set(SetArgs),
    /// Sanitize rich text from a file or stdin.
    Sanitize(SanitizeArgs),
    /// Export every catalog page to a TOML archive.
    Export(ExportArgs),
    /// Import page copy from a TOML archive.
    Import(ImportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Only print this page.
    #[arg(long, value_name = "ID")]
    pub page: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SetArgs {
    /// Page id to update.
    #[arg(long, value_name = "ID")]
    pub page: String,

    /// Write to the metadata hash instead of the content hash.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub metadata: bool,

    /// Sections to write, as SECTION=VALUE.
    #[arg(value_name = "SECTION=VALUE", required = true)]
    pub sections: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SanitizeArgs {
    /// File to read; stdin when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Destination TOML file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// Source TOML file produced by `pagecopy export`.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
