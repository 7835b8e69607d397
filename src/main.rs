//! `xitter-txgen`: print an X client transaction ID for a saved home page.

use std::{
   io,
   path::PathBuf,
   process::ExitCode,
};

use clap::{
   ArgAction,
   Parser,
};
use tracing_subscriber::EnvFilter;
use xitter_txgen::{
   ClientTransaction,
   ClientTransactionOptions,
   Config,
   Error,
   RequestParams,
   ScriptFetcher,
   TokenGenerator,
   read_source,
   run,
};

#[derive(Parser)]
#[command(
   name = "xitter-txgen",
   about = "Generate an X client transaction ID from a local HTML file",
   version
)]
struct Cli {
   /// HTTP method of the request (default: POST).
   #[arg(long)]
   method: Option<String>,

   /// Request path (default: /1.1/jot/client_event.json).
   #[arg(long)]
   path: Option<String>,

   /// HTML file containing the x.com page source.
   #[arg(long, value_name = "FILE")]
   html_file: PathBuf,

   /// The ondemand.s.*.js chunk, when the page does not inline the key byte
   /// indices.
   #[arg(long, value_name = "FILE")]
   ondemand_file: Option<PathBuf>,

   /// Never download the ondemand.s.*.js chunk the page references.
   #[arg(long)]
   offline: bool,

   /// Seconds since X's epoch to embed instead of the current time.
   #[arg(long, value_name = "SECONDS")]
   time: Option<u32>,

   /// Log progress to stderr (-v debug, -vv trace). RUST_LOG overrides.
   #[arg(short, long, action = ArgAction::Count)]
   verbose: u8,
}

fn main() -> ExitCode {
   let cli = Cli::parse();
   init_tracing(cli.verbose);

   match generate(&cli) {
      Ok(token) => {
         println!("{token}");
         ExitCode::SUCCESS
      },
      Err(err) => {
         eprintln!("Error: {err}");
         ExitCode::FAILURE
      },
   }
}

fn generate(cli: &Cli) -> Result<String, Error> {
   let ondemand_js = cli.ondemand_file.as_deref().map(read_source).transpose()?;

   let generator = TokenGenerator::<ClientTransaction>::new(ClientTransactionOptions {
      ondemand_js,
      fetch_ondemand: ondemand_fetcher(cli.offline),
      time:           cli.time,
   });
   let params = RequestParams {
      method: cli.method.clone(),
      path:   cli.path.clone(),
   };

   run(&params, &cli.html_file, &generator, &Config::default())
}

#[cfg(feature = "fetch")]
fn ondemand_fetcher(offline: bool) -> Option<ScriptFetcher> {
   (!offline).then_some(xitter_txgen::fetch_ondemand as ScriptFetcher)
}

#[cfg(not(feature = "fetch"))]
const fn ondemand_fetcher(_offline: bool) -> Option<ScriptFetcher> {
   None
}

/// Logs go to stderr so stdout only ever carries the token. Quiet unless
/// asked: the `Error:` line is the failure report.
fn init_tracing(verbosity: u8) {
   let level = match verbosity {
      0 => "error",
      1 => "debug",
      _ => "trace",
   };
   let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(io::stderr)
      .init();
}
