/*!
 * irods-demo - iRODS put/get demonstration client
 *
 * Writes a fixed test string to a target data object, then streams a source
 * data object to standard output.
 */

use anyhow::Context;
use clap::error::ErrorKind;
use irods_demo::credentials::{build_account, TerminalPassword};
use irods_demo::error::{DemoError, EXIT_SUCCESS};
use irods_demo::protocol::NativeAccessFactory;
use irods_demo::{logging, transfer, DemoConfig, OptionSet, TransferReport};

fn main() {
    let options = match OptionSet::from_env() {
        Ok(options) => options,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let err = DemoError::Usage(e.to_string());
                // clap's rendering already ends in a newline
                eprint!("{}", err);
                std::process::exit(err.exit_code());
            }
        },
    };

    let code = match run(options) {
        Ok(report) => {
            tracing::info!(
                bytes_put = report.bytes_put,
                bytes_got = report.bytes_got,
                "Done"
            );
            EXIT_SUCCESS
        }
        Err(err) => report_failure(&err),
    };
    std::process::exit(code);
}

fn run(options: OptionSet) -> anyhow::Result<TransferReport> {
    logging::init_logging(options.effective_log_level(), options.log_file.as_deref())?;

    let config = DemoConfig::load(options.config.as_deref())?;
    let options = options.with_defaults(&config.connection);

    let account = build_account(&options, &TerminalPassword::default())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let factory = NativeAccessFactory::new(config.client);
    let report = runtime.block_on(async {
        let mut stdout = tokio::io::stdout();
        transfer::run(
            &factory,
            &account,
            options.target(),
            options.source(),
            &mut stdout,
        )
        .await
    })?;

    Ok(report)
}

/// Report a failure with its cause chain
///
/// Failures past option parsing still end the process normally. The headline
/// is printed once; the chain below it starts at the first cause.
fn report_failure(err: &anyhow::Error) -> i32 {
    tracing::debug!(error = %err, "Run failed");
    eprintln!("Something bad happened: {}", err);
    for (depth, cause) in err.chain().skip(1).enumerate() {
        eprintln!("  {}: caused by: {}", depth, cause);
    }
    EXIT_SUCCESS
}
