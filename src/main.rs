use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use courseport::config::{load_config, Config};
use courseport::server::Server;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_PORT: u16 = 8655;

// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
}

use colors::*;

#[derive(Parser)]
#[command(name = "courseport")]
#[command(version = VERSION)]
#[command(about = "Course content portal. Login gate, file browser, inline preview.")]
#[command(long_about = "courseport - Course content portal\n\n\
    Start the portal:    courseport\n\
    Pick a port:         courseport serve --port 9000\n\
    List course files:   courseport files\n\
    Show configuration:  courseport config show")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose mode: detailed output for debugging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the portal server (default when no command is given)
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address; 0.0.0.0 exposes the portal to the network
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// List the course files the configured source currently serves
    Files,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config()?;

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    match cli.command {
        None => runtime.block_on(start_server(&config, None, "127.0.0.1")),
        Some(Commands::Serve { port, bind }) => {
            runtime.block_on(start_server(&config, port, &bind))
        }
        Some(Commands::Files) => runtime.block_on(list_files(&config)),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => show_config(&config),
        },
    }
}

async fn start_server(config: &Config, port_override: Option<u16>, bind: &str) -> Result<()> {
    let port = port_override.or(config.port).unwrap_or(DEFAULT_PORT);

    println!("{BLUE}[i]{RESET} Starting portal...");
    println!();
    println!("  Portal: {CYAN}http://{bind}:{port}{RESET}");
    println!("  Source: {}", config.source.describe());
    println!(
        "  DOCX preview: {}",
        if config.docx_preview_enabled() {
            format!("{GREEN}enabled{RESET}")
        } else {
            format!("{DIM}disabled{RESET}")
        }
    );
    println!();
    println!("{DIM}Press Ctrl+C to stop{RESET}");
    println!();

    let server = Server::new(port)
        .with_config(config.clone())
        .with_bind_address(bind);
    server.start().await?;

    Ok(())
}

async fn list_files(config: &Config) -> Result<()> {
    let source = config.source.build();

    println!();
    println!("{BRIGHT_CYAN}{BOLD}=== Course Files ==={RESET}");
    println!("{BLUE}[i]{RESET} Source: {}", config.source.describe());
    println!();

    match source.list_files().await {
        Ok(files) if files.is_empty() => {
            println!("{BLUE}[i]{RESET} No supported files found (PDF, PPTX, DOCX)");
        }
        Ok(files) => {
            for file in &files {
                println!("  {}  {}", file.kind.as_str().cyan(), file.name);
            }
            println!();
            println!("{GREEN}[✓]{RESET} {} file(s)", files.len());
        }
        Err(e) => {
            println!("{RED}[✗]{RESET} {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!();
    println!("{BRIGHT_CYAN}{BOLD}=== courseport Configuration ==={RESET}");
    println!();
    println!("  Username:     {}", config.username);
    println!("  Password:     {DIM}(set){RESET}");
    println!(
        "  Port:         {}",
        config.port.unwrap_or(DEFAULT_PORT)
    );
    println!("  Source:       {}", config.source.describe());
    println!(
        "  DOCX preview: {}",
        if config.docx_preview_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    Ok(())
}
