//! rosapi CLI Client
//!
//! Logs in to a router, runs one command and prints the records.

use clap::Parser;
use rosapi::{Command, Config, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// rosapi CLI
#[derive(Parser, Debug)]
#[command(name = "rosapi-cli")]
#[command(about = "Run a command against a RouterOS API endpoint")]
#[command(version)]
struct Args {
    /// Router address
    #[arg(short = 'H', long, default_value = "192.168.88.1")]
    host: String,

    /// API port (0 uses the default 8728)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// User name
    #[arg(short, long, default_value = "admin")]
    user: String,

    /// Password
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// Socket timeout in milliseconds (minimum 100)
    #[arg(short, long, default_value = "30000")]
    timeout_ms: u64,

    /// Command path, e.g. /system/resource/print
    path: String,

    /// Parameter as name=value (a bare name sends an empty value)
    #[arg(long = "param")]
    params: Vec<String>,

    /// Property to return (repeatable)
    #[arg(long = "prop")]
    props: Vec<String>,

    /// Raw query clause, e.g. ?type=ether (repeatable)
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// Command tag
    #[arg(long)]
    tag: Option<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,rosapi=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder().timeout_ms(args.timeout_ms).build();
    let mut session = Session::new(config);

    if let Err(e) = session.login(&args.host, &args.user, &args.password, args.port) {
        tracing::error!("Login failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Logged in to {} as {}", args.host, args.user);

    let command = build_command(&args);
    let result = session.execute(&command);
    session.close();

    match result {
        Ok(records) => {
            for record in records {
                let mut fields: Vec<_> = record.into_iter().collect();
                fields.sort();
                let line: Vec<String> = fields
                    .into_iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                println!("{}", line.join(" "));
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_command(args: &Args) -> Command {
    let mut command = Command::new(args.path.as_str());
    for param in &args.params {
        match param.split_once('=') {
            Some((name, value)) => command.add_parameter(name, value),
            None => command.push_parameter(rosapi::Parameter::flag(param.as_str())),
        }
    }
    command.add_property(args.props.iter().map(String::as_str));
    command.add_query(args.queries.iter().map(String::as_str));
    if let Some(tag) = &args.tag {
        command.set_tag(tag.as_str());
    }
    command
}
