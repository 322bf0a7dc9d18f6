//! Whois Lookup CLI Application
//!
//! Checks whether a single domain is available using WhoAPI, with a local
//! 24 hour cache. Always prints one JSON object to stdout and exits with 0 for
//! available/taken and 1 for any error. Logs go to stderr.

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use whois_lookup_lib::{
    check_domain_argument, load_env_config, ConfigManager, EnvConfig, LookupResult, WhoisChecker,
    WhoisLookupError,
};

/// CLI arguments for whois-lookup
#[derive(Parser, Debug)]
#[command(name = "whois-lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domain availability via WhoAPI")]
#[command(
    long_about = "Check domain availability via WhoAPI.\n\nResults are cached for 24 hours. \
    Requires a WhoAPI key in WHOAPI_TOKEN.\nOutput is always a single JSON object, \
    except for --help and --version, which print plain text."
)]
pub struct Args {
    /// Domain name to check (e.g. example.com)
    #[arg(value_name = "DOMAIN")]
    pub domains: Vec<String>,
}

fn main() {
    init_logging();

    let result = run(std::env::args_os(), load_env_config());
    emit(&result);
    process::exit(result.exit_code());
}

/// Send logs to stderr so stdout carries only the JSON result.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// ParseArgs -> Validate -> (config, runtime) -> lookup.
fn run<I, T>(argv: I, env: EnvConfig) -> LookupResult
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let domain = match parse_domain(argv) {
        Ok(domain) => domain,
        Err(e) => return e.into(),
    };

    if let Err(e) = check_domain_argument(&domain) {
        return e.into();
    }

    let manager = ConfigManager::new();
    let config = match manager
        .discover_and_load(env.config_path.as_deref())
        .and_then(|file| manager.resolve(&file, &env))
    {
        Ok(config) => config,
        Err(e) => return e.into(),
    };
    debug!("resolved configuration: {:?}", redacted(&config));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            return WhoisLookupError::system(format!("Failed to start async runtime: {}", e))
                .into()
        }
    };

    let checker = match WhoisChecker::new(&config) {
        Ok(checker) => checker,
        Err(e) => return e.into(),
    };

    runtime.block_on(checker.check(&domain))
}

/// Parse the command line, requiring exactly one domain.
///
/// `--help` and `--version` print and exit 0 as usual; every other parse
/// problem becomes a validation error.
fn parse_domain<I, T>(argv: I) -> Result<String, WhoisLookupError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let rendered = e.to_string();
            let reason = rendered
                .lines()
                .next()
                .unwrap_or("invalid arguments")
                .trim_start_matches("error: ")
                .to_string();
            return Err(WhoisLookupError::invalid_domain("", reason));
        }
    };

    let mut domains = args.domains;
    match domains.len() {
        0 => Err(WhoisLookupError::invalid_domain(
            "",
            "No domain given. Exactly one domain argument is required",
        )),
        1 => Ok(domains.remove(0)),
        n => Err(WhoisLookupError::invalid_domain(
            "",
            format!("Expected exactly one domain argument, got {}", n),
        )),
    }
}

/// Configuration for debug logging, without the credential.
fn redacted(config: &whois_lookup_lib::LookupConfig) -> whois_lookup_lib::LookupConfig {
    let mut shown = config.clone();
    if shown.api_token.is_some() {
        shown.api_token = Some("***".to_string());
    }
    shown
}

/// Print the result as pretty JSON.
fn emit(result: &LookupResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => println!(
            "{}",
            serde_json::json!({
                "status": "error",
                "error_type": "system_error",
                "message": format!("Failed to serialize result: {}", e),
                "suggested_action": "Report this as a bug",
            })
        ),
    }
}
