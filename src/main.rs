use anyhow::Context;
use clap::Parser;
use wps_commons::core::capabilities::CapabilitiesSkeleton;
use wps_commons::utils::error::ErrorCategory;
use wps_commons::utils::{logger, validation::Validate};
use wps_commons::{CliConfig, DetachedContainer, TomlConfig, WpsError};

fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(&cli) {
        match e.downcast_ref::<WpsError>() {
            Some(wps_error) => {
                tracing::error!(
                    "{} (Category: {:?})",
                    wps_error,
                    wps_error.category()
                );
                eprintln!("Error: {:#}", e);
                eprintln!("Suggestion: {}", wps_error.recovery_suggestion());

                let exit_code = match wps_error.category() {
                    ErrorCategory::Configuration => 2,
                    ErrorCategory::State | ErrorCategory::Container => 1,
                    ErrorCategory::System => 3,
                };
                std::process::exit(exit_code);
            }
            None => {
                tracing::error!("{:#}", e);
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: &CliConfig) -> anyhow::Result<()> {
    tracing::info!("Loading deployment from {}", cli.config.display());
    let mut config = TomlConfig::from_file(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    cli.override_server(&mut config.server);
    if cli.verbose {
        tracing::debug!("Deployment: {:?}", config);
    }

    config.validate()?;

    let wps = config.build(DetachedContainer::new())?;
    let document = wps.configuration_xml()?;

    if let Some(path) = &cli.capabilities {
        let capabilities = CapabilitiesSkeleton::default().to_xml()?;
        std::fs::write(path, capabilities)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Capabilities skeleton written to {}", path.display());
    }

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Configuration for {} written to {}", wps.service_url(), path.display());
        }
        None => print!("{}", document),
    }

    Ok(())
}
