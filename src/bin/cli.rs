//! lwwkv CLI Client
//!
//! Command-line interface for interacting with a lwwkv server.

use std::net::TcpStream;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use clap::{Parser, Subcommand};

use lwwkv::protocol::{
    decode_get_payload, decode_key_list, read_response, write_command, Command, Response, Status,
};
use lwwkv::{KvError, Result};

/// lwwkv CLI
#[derive(Parser, Debug)]
#[command(name = "lwwkv-cli")]
#[command(about = "CLI for the lwwkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// LWW version; defaults to the current time in nanoseconds
        #[arg(short, long)]
        version: Option<i64>,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys, sorted
    Keys,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut stream = TcpStream::connect(&args.server)
        .map_err(|e| KvError::Network(format!("connect {} failed: {}", args.server, e)))?;

    let command = match &args.command {
        Commands::Get { key } => Command::Get { key: key.clone() },
        Commands::Set { key, value, version } => Command::Put {
            key: key.clone(),
            value: Bytes::from(value.clone().into_bytes()),
            version: (*version).unwrap_or_else(now_nanos),
        },
        Commands::Del { key } => Command::Delete { key: key.clone() },
        Commands::Keys => Command::ListKeys,
        Commands::Ping => Command::Ping,
    };

    write_command(&mut stream, &command)?;
    let response = read_response(&mut stream)?;
    print_response(&args.command, response)
}

fn print_response(command: &Commands, response: Response) -> Result<()> {
    if response.status == Status::Error {
        let message = response
            .payload
            .map(|p| String::from_utf8_lossy(&p).into_owned())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(KvError::Network(format!("server error: {}", message)));
    }

    match command {
        Commands::Get { .. } => match response.status {
            Status::NotFound => println!("(not found)"),
            _ => {
                let payload = response.payload.unwrap_or_default();
                let (version, value) = decode_get_payload(&payload)?;
                println!("{}", String::from_utf8_lossy(&value));
                println!("version: {}", version);
            }
        },
        Commands::Keys => {
            let payload = response.payload.unwrap_or_default();
            for key in decode_key_list(&payload)? {
                println!("{}", key);
            }
        }
        _ => {
            if let Some(payload) = response.payload {
                println!("{}", String::from_utf8_lossy(&payload));
            }
        }
    }

    Ok(())
}

/// Default version source, mirroring a wall-clock LWW timestamp
fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}
