use clap::{parser::ValueSource, ArgMatches, CommandFactory, FromArgMatches, Parser};
use facetry_http::{serve, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "facetry", version, about = "Faceted filter-and-sort server")]
struct Cli {
    /// Directory holding settings.json and records.json
    #[arg(long, env = "FACETRY_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,
    #[arg(long, env = "FACETRY_BIND_ADDR")]
    bind_addr: Option<String>,
    #[arg(long, env = "FACETRY_PORT")]
    port: Option<u16>,

    /// Maximum number of concurrent sessions
    #[arg(long, env = "FACETRY_MAX_SESSIONS", default_value_t = 10_000)]
    max_sessions: usize,

    /// Seconds a session may sit idle before it is dropped
    #[arg(long, env = "FACETRY_SESSION_TTL_SECS", default_value_t = 1800)]
    session_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let config = resolve_config(&cli, &matches)
        .map_err(|msg| std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))?;
    serve(config).await
}

fn resolve_config(cli: &Cli, matches: &ArgMatches) -> Result<ServerConfig, String> {
    if cli.max_sessions == 0 {
        return Err("--max-sessions must be at least 1".to_string());
    }
    if cli.session_ttl_secs == 0 {
        return Err("--session-ttl-secs must be at least 1".to_string());
    }
    Ok(ServerConfig {
        data_dir: cli.data_dir.clone(),
        bind_addr: resolve_bind_addr(cli, matches)?,
        max_sessions: cli.max_sessions,
        session_ttl: Duration::from_secs(cli.session_ttl_secs),
    })
}

/// A `--port` flag overrides `FACETRY_BIND_ADDR`. Otherwise a full bind
/// address wins over a bare port. Both flags together are an error.
fn resolve_bind_addr(cli: &Cli, matches: &ArgMatches) -> Result<String, String> {
    if is_set_on_command_line(matches, "bind_addr") && is_set_on_command_line(matches, "port") {
        return Err("--bind-addr cannot be used with --port".to_string());
    }

    if is_set_on_command_line(matches, "port") {
        if let Some(port) = cli.port {
            return Ok(format!("127.0.0.1:{port}"));
        }
    }

    if let Some(bind_addr) = &cli.bind_addr {
        return Ok(bind_addr.clone());
    }

    if let Some(port) = cli.port {
        return Ok(format!("127.0.0.1:{port}"));
    }

    Ok("127.0.0.1:7700".to_string())
}

fn is_set_on_command_line(matches: &ArgMatches, arg: &str) -> bool {
    matches.value_source(arg) == Some(ValueSource::CommandLine)
}
