//! relay-get: fetch a single OID value through the relay engine.

use clap::Parser;
use std::process::ExitCode;

use snmp_relay::cli::{CommonArgs, OutputArgs};
use snmp_relay::engine::{QueryEngine, QueryResult};
use snmp_relay::report::QueryReport;

/// Fetch one SNMP OID value.
#[derive(Debug, Parser)]
#[command(name = "relay-get", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// OID to retrieve (dotted notation, optional leading dot).
    #[arg(value_name = "OID")]
    oid: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let engine = QueryEngine::new(args.common.config_store())
        .timeout(args.common.timeout_duration())
        .retries(args.common.retries);

    let result = engine.get_value(&args.oid).await;
    let report = QueryReport::from(&result);

    if args.output.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error writing output: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report.render_text());
    }

    match result {
        QueryResult::Success { .. } => ExitCode::SUCCESS,
        QueryResult::Failure { .. } => ExitCode::FAILURE,
    }
}
