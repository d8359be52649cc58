//! fuego-desktop-client - Thin client for the fuego-desktop bridge.
//!
//! CHANGELOG:
//! - 10/14/2026 - --follow streams pushed events after the response
//! - 10/12/2026 - Initial implementation

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::process::ExitCode;
use std::time::Duration;

use fuego_desktop::bridge::{self, Request, ServerFrame};
use fuego_desktop::config::{expand_path, ShellConfig};
use fuego_desktop::output::{format_error, OutputControls};

#[derive(Parser)]
#[command(name = "fuego-desktop-client")]
#[command(about = "Thin client for the fuego-desktop bridge")]
struct Cli {
    /// Method to call (e.g. health, get-balance, start-node)
    method: String,

    /// Socket path (default: <home>/fuego-desktop.sock)
    #[arg(long)]
    socket: Option<String>,

    /// JSON parameters (as string)
    #[arg(long)]
    params: Option<String>,

    /// Request timeout (seconds)
    #[arg(long, default_value = "30.0")]
    timeout: f64,

    /// Keep printing pushed events after the response
    #[arg(long)]
    follow: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,

    /// Comma-separated field allowlist
    #[arg(long)]
    fields: Option<String>,

    /// Truncate text fields to this length
    #[arg(long)]
    max_text_chars: Option<usize>,
}

fn socket_path(cli: &Cli) -> Result<std::path::PathBuf> {
    match cli.socket {
        Some(ref socket) => Ok(expand_path(socket)),
        None => Ok(bridge::default_socket_path(&ShellConfig::from_env()?.home)),
    }
}

fn run(cli: Cli) -> Result<bool> {
    let params: HashMap<String, serde_json::Value> = match cli.params {
        Some(ref p) => serde_json::from_str(p).context("--params must be a JSON object")?,
        None => HashMap::new(),
    };
    let controls = OutputControls {
        compact: cli.compact,
        fields: cli.fields.clone(),
        max_text_chars: cli.max_text_chars,
    };

    let request = Request::new(uuid::Uuid::new_v4().to_string(), cli.method.clone(), params);

    let socket_path = socket_path(&cli)?;
    let stream = UnixStream::connect(&socket_path)
        .with_context(|| format!("Cannot connect to {:?}; is fuego-desktop running?", socket_path))?;

    let timeout = Duration::from_secs_f64(cli.timeout);
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    (&stream).write_all(request.to_ndjson_line()?.as_bytes())?;

    let mut reader = BufReader::new(&stream);
    let mut line = String::new();
    let mut ok = None;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let frame: ServerFrame = match serde_json::from_str(line.trim()) {
            Ok(frame) => frame,
            Err(_) => continue,
        };

        match frame {
            ServerFrame::Event(event) => {
                if cli.follow {
                    println!("{}", controls.format_event(&event));
                }
            }
            ServerFrame::Response(response) if response.id == request.id => {
                if response.ok {
                    controls.print(&response.result);
                } else {
                    let (code, message) = response
                        .error
                        .map(|e| (e.code, e.message))
                        .unwrap_or_else(|| ("ERROR".to_string(), "unknown".to_string()));
                    eprintln!("{}", format_error(&code, &message));
                }
                ok = Some(response.ok);
                if !cli.follow {
                    break;
                }
                // events may be quiet for a long time
                stream.set_read_timeout(None)?;
            }
            ServerFrame::Response(_) => {}
        }
    }

    match ok {
        Some(ok) => Ok(ok),
        None => bail!("Connection closed before a response arrived"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
