use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber;
use tracing_subscriber::filter::EnvFilter;

/// Command-line overrides layered on top of the file and environment configuration.
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub config_path: Option<String>,
    pub output_dir: Option<String>,
    pub download_parallelism: Option<usize>,
}

pub struct Args {
    pub fetch: FetchArgs,
}

#[derive(Debug, Parser)]
#[command(
    name = "relfetch",
    version,
    about = "Download named assets of a GitHub release",
    long_about = "Download named assets of a GitHub release.\n\n\
        Inputs are read from the environment (github_access_token, tag, source, \
        repository_url) and optionally from a config file."
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file, overridden by environment variables"
    )]
    config: Option<String>,

    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Overrides the directory downloaded files are written to"
    )]
    output_dir: Option<String>,

    #[arg(
        long = "download-parallelism",
        value_name = "N",
        help = "Maximum number of simultaneous downloads"
    )]
    download_parallelism: Option<usize>,
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    for directive in ["hyper_util=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    Args {
        fetch: FetchArgs {
            config_path: cli.config,
            output_dir: cli.output_dir,
            download_parallelism: cli.download_parallelism,
        },
    }
}
