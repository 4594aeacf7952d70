use clap::Parser;
use rpc_fetch_client::Config;

/// Calls a Supabase/PostgREST RPC function and prints the first row it returns as JSON.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct CommandLineArgs {
  /// Base URL of the project, e.g. https://<project>.supabase.co.
  #[arg(long, env = "SUPABASE_URL")]
  pub url: String,

  /// API key sent as `apikey` and bearer token.
  #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
  pub key: String,

  /// Name of the RPC function, e.g. get_random_question.
  pub procedure: String,

  /// Named arguments as a JSON object, e.g. '{"category": "history"}'.
  #[arg(long)]
  pub args: Option<String>,

  /// Pretty-print the returned record.
  #[arg(long)]
  pub pretty: bool,

  /// Verbose logging.
  #[arg(long)]
  pub dev: bool,
}

impl CommandLineArgs {
  pub fn config(&self) -> Config {
    return Config::new(self.url.clone(), self.key.clone());
  }
}

/// Parses `--args`, which has to be a JSON object. Absent arguments yield `{}`.
pub fn parse_call_args(args: Option<&str>) -> Result<serde_json::Value, String> {
  let Some(args) = args else {
    return Ok(serde_json::Value::Object(Default::default()));
  };

  return match serde_json::from_str::<serde_json::Value>(args) {
    Ok(value @ serde_json::Value::Object(_)) => Ok(value),
    Ok(other) => Err(format!("--args must be a JSON object, got: {other}")),
    Err(err) => Err(format!("--args is not valid JSON: {err}")),
  };
}
