use invoice_sqli_probe::configuration::get_configuration;
use invoice_sqli_probe::suite::run_suite;
use invoice_sqli_probe::telemetry::{get_subscriber, init_subscriber};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so that stdout only carries the report
    let subscriber = get_subscriber("invoice-sqli-probe".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    tracing::info!(base_url = %configuration.target.base_url, "Probing invoice service");

    let report = run_suite(&configuration).await?;
    println!("{report}");

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
