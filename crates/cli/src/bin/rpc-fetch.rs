#![allow(clippy::needless_return)]

use clap::Parser;
use rpc_fetch_client::RpcFetcher;

use rpc_fetch_cli::{CommandLineArgs, parse_call_args};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_logger(dev: bool) {
  const DEFAULT: &str = "info";

  env_logger::Builder::from_env(if dev {
    env_logger::Env::new().default_filter_or(format!("{DEFAULT},rpc_fetch_client=debug"))
  } else {
    env_logger::Env::new().default_filter_or(DEFAULT)
  })
  .format_timestamp_micros()
  .init();
}

async fn async_main() -> Result<(), BoxError> {
  let args = CommandLineArgs::parse();
  init_logger(args.dev);

  let call_args = parse_call_args(args.args.as_deref())?;
  let fetcher = RpcFetcher::connect(&args.config())?;

  let record = fetcher
    .fetch_first_with_args(&args.procedure, &call_args)
    .await?;
  log::debug!("Fetched record from '{}'", args.procedure);

  if args.pretty {
    println!("{}", serde_json::to_string_pretty(&record)?);
  } else {
    println!("{record}");
  }

  return Ok(());
}

fn main() -> Result<(), BoxError> {
  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()?;
  return runtime.block_on(async_main());
}
