//! Redirector CLI - setup wizard for a redirection proxy

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use redirector::layout::DEFAULT_DATA_DIR;
use redirector::wizard;
use redirector::{
    CertificateIssuer, ConfigStore, DataDir, EndpointCatalog, Error, FileStatus, HttpTransport,
    Prober, TerminalPrompter, Wizard,
};

#[derive(Parser)]
#[command(name = "redirector")]
#[command(about = "Setup wizard for a redirection proxy")]
#[command(version)]
struct Cli {
    /// Data directory holding config.json, cert.pem and key.pem
    #[arg(short, long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the setup wizard
    Setup {
        /// TOML endpoint catalog (defaults to the built-in one)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Seconds to wait for each health check
        #[arg(long, default_value_t = 5)]
        probe_timeout: u64,
    },

    /// Regenerate the certificate and key, then set the https flag
    RegenCerts,

    /// Check a config file and print its contents
    ValidateConfig {
        /// Path to config file (defaults to the one in the data directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = DataDir::new(cli.data_dir);

    match cli.command {
        Commands::Setup {
            catalog,
            probe_timeout,
        } => {
            let catalog = match catalog {
                Some(path) => {
                    tracing::info!(path = %path.display(), "Loading endpoint catalog");
                    EndpointCatalog::from_file(&path).unwrap_or_else(|e| fail(e))
                }
                None => EndpointCatalog::builtin(),
            };
            let transport = HttpTransport::new(Duration::from_secs(probe_timeout))
                .unwrap_or_else(|e| fail(e));
            let status = ConfigStore::new(data_dir.config_path()).classify();
            tracing::info!(status = %status, "Config status at startup");

            let mut setup = Wizard::new(
                catalog,
                Prober::new(transport),
                data_dir,
                TerminalPrompter::stdio(),
            )
            .with_initial_status(status);

            match setup.run() {
                Ok(outcome) => tracing::info!(?outcome, "Setup finished"),
                Err(e) => fail(e),
            }
        }

        Commands::RegenCerts => {
            let mut prompter = TerminalPrompter::stdio();
            let issuer = CertificateIssuer::new();
            if let Err(e) = wizard::regenerate_certificates(&mut prompter, &issuer, &data_dir) {
                fail(e);
            }
        }

        Commands::ValidateConfig { config } => {
            let path = config.unwrap_or_else(|| data_dir.config_path());
            println!("Validating configuration: {}", path.display());

            let store = ConfigStore::new(&path);
            match store.classify() {
                FileStatus::Valid => {}
                status => {
                    eprintln!("Error: config is {}", status);
                    if let Err(e) = store.load() {
                        eprintln!("  {}", e);
                    }
                    std::process::exit(1);
                }
            }

            let cfg = store.load()?;
            println!("Configuration is valid!");
            println!();
            println!("  Decrypt outgoing: {}", cfg.config.decrypt_outgoing);
            println!(
                "  HTTPS: {}",
                match cfg.config.https {
                    Some(true) => "enabled",
                    Some(false) => "disabled",
                    None => "(not set)",
                }
            );
            println!("  Endpoints: {}", cfg.endpoints.len());
            for (from, to) in &cfg.endpoints {
                println!("    {} -> {}", from, to);
            }
        }
    }

    Ok(())
}

/// Report a fatal error to the operator and exit
fn fail(err: Error) -> ! {
    eprintln!("[err]: {}", err);
    if let Some(hint) = err.hint() {
        eprintln!("       {}", hint);
    }
    std::process::exit(1);
}
