//! relay-walk: walk an OID subtree through the relay engine.

use clap::Parser;
use std::process::ExitCode;

use snmp_relay::cli::{CommonArgs, OutputArgs};
use snmp_relay::engine::{DEFAULT_WALK_LIMIT, QueryEngine, WalkResult};
use snmp_relay::report::WalkReport;

/// Walk an SNMP OID subtree.
#[derive(Debug, Parser)]
#[command(name = "relay-walk", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Maximum number of entries to return.
    #[arg(short, long, default_value_t = DEFAULT_WALK_LIMIT)]
    max_results: usize,

    /// Root OID of the subtree (dotted notation, optional leading dot).
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

    let result = engine.walk(&args.oid, args.max_results).await;
    let report = WalkReport::from(&result);

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
        WalkResult::Success { .. } => ExitCode::SUCCESS,
        WalkResult::Failure { .. } => ExitCode::FAILURE,
    }
}
