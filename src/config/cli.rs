use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::routing::{RoutingContext, RoutingError};

/// Command-line arguments for the pageless binary.
#[derive(Debug, Parser)]
#[command(name = "pageless", version, about = "Infinite scroll for post listings")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PAGELESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and administrative HTTP listeners.
    Serve(Box<ServeArgs>),
    /// Seed default options that are not set yet.
    Activate(StoreArgs),
    /// Print the generated script for a listing.
    Script(ScriptArgs),
    /// Print the config hash and script file name for a listing.
    Hash(ScriptArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreArgs {
    /// Override the TOML file options are persisted to.
    #[arg(long = "options-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub options_file: Option<PathBuf>,

    /// Override the option namespace.
    #[arg(long = "options-namespace", value_name = "NAME")]
    pub options_namespace: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the public base URL used in generated links.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,

    /// Override the post archive served by the demonstration host.
    #[arg(long = "site-archive", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub site_archive: Option<PathBuf>,

    /// Override the number of remembered script configurations.
    #[arg(long = "registry-capacity", value_name = "COUNT")]
    pub registry_capacity: Option<usize>,
}

/// Listing selector shared by `script` and `hash`.
#[derive(Debug, Args, Default, Clone)]
#[command(group(ArgGroup::new("filter").args(["tag", "date", "search"])))]
pub struct ScriptArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Tag listing.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Date archive as `year[/month[/day]]`.
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Search results for the given criteria.
    #[arg(long, value_name = "CRITERIA")]
    pub search: Option<String>,
}

impl ScriptArgs {
    pub fn routing_context(&self) -> Result<RoutingContext, RoutingError> {
        match (&self.tag, &self.date, &self.search) {
            (Some(tag), _, _) => RoutingContext::from_filter(Some("tag"), Some(tag)),
            (_, Some(date), _) => RoutingContext::from_filter(Some("date"), Some(date)),
            (_, _, Some(criteria)) => RoutingContext::from_filter(Some("search"), Some(criteria)),
            _ => Ok(RoutingContext::None),
        }
    }
}
