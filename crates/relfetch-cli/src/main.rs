use relfetch_lib::cli::{parse_args, resolve_fetch, run_fetch};
use relfetch_lib::error::RelFetchError;
use std::process::ExitCode;

async fn run() -> Result<(), RelFetchError> {
    let args = parse_args();
    let params = resolve_fetch(args.fetch)?;
    run_fetch(params).await?;
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("Failed to install error reporter: {err}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
