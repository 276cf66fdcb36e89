use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "wps-config")]
#[command(about = "Render the configuration document of an embedded WPS deployment")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML deployment description")]
    pub config: PathBuf,

    #[arg(long, short, help = "Write the document here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Override server.host")]
    pub host: Option<String>,

    #[arg(long, help = "Override server.port")]
    pub port: Option<u16>,

    #[arg(long, help = "Serve over https")]
    pub https: bool,

    #[arg(long, help = "Also write the capabilities skeleton to this file")]
    pub capabilities: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Applies command line overrides to the loaded deployment.
    pub fn override_server(&self, server: &mut crate::config::toml_config::ServerConfig) {
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if self.https {
            server.https = true;
        }
    }
}
