// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Archescan: historical artifact catalogue
//!
//! Web server plus a few maintenance commands over the same stores.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use archescan::annotator::Annotator;
use archescan::artifacts::ArtifactCatalog;
use archescan::config::AppConfig;
use archescan::gallery::Gallery;
use archescan::gemini::GeminiClient;
use archescan::store::JsonStore;
use archescan::videos::VideoList;
use archescan::{ArchescanError, Result};

/// Archescan CLI - artifact catalogue with AI summaries
#[derive(Parser, Debug)]
#[command(name = "archescan")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Historical artifact catalogue with AI-generated summaries", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Catalogued artifacts
    Artifacts {
        #[command(subcommand)]
        action: ArtifactCommands,
    },

    /// Video list
    Videos {
        #[command(subcommand)]
        action: VideoCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show AI and storage status
    Status,
}

#[derive(Subcommand, Debug)]
enum ArtifactCommands {
    /// List catalogued artifacts
    List {
        /// Only artifacts identified from their image
        #[arg(long)]
        image_only: bool,
    },

    /// Delete an artifact and its image
    Delete {
        /// Stored file name of the artifact
        filename: String,
    },
}

#[derive(Subcommand, Debug)]
enum VideoCommands {
    /// List videos
    List,

    /// Add a video from a YouTube link
    Add {
        title: String,
        url: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = AppConfig::load_with_env(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Artifacts { action }) => run_artifacts_command(config, action),
        Some(Commands::Videos { action }) => run_videos_command(config, action),
        Some(Commands::Config { action }) => run_config_command(config, action),
        Some(Commands::Status) => run_status(config).await,
        None => run_serve(config, None, None).await,
    }
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    // Apply CLI overrides
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    info!("Archescan v{}", env!("CARGO_PKG_VERSION"));
    info!("Artifacts: {:?}", config.storage.artifacts_json);
    info!("Uploads: {:?}", config.storage.upload_dir);

    let annotator = Annotator::from_config(&config.ai)?;
    archescan::web::start_server(config, annotator).await
}

fn run_artifacts_command(config: AppConfig, action: ArtifactCommands) -> Result<()> {
    // Maintenance never needs the AI service
    let catalog = ArtifactCatalog::open(&config.storage, Annotator::disabled(), config.prompts.clone())?;

    match action {
        ArtifactCommands::List { image_only } => {
            let artifacts = if image_only {
                catalog.list_image_only()?
            } else {
                catalog.list()?
            };

            if artifacts.is_empty() {
                println!("No artifacts catalogued.");
            }
            for a in artifacts {
                let marker = if a.image_only { " [identified]" } else { "" };
                println!("{}  {}{}", a.filename, a.name, marker);
            }
        }
        ArtifactCommands::Delete { filename } => {
            let removed = catalog.delete(&filename)?;
            if removed == 0 {
                warn!("No record for {}", filename);
            }
            println!("Removed {} record(s) for {}", removed, filename);
        }
    }

    Ok(())
}

fn run_videos_command(config: AppConfig, action: VideoCommands) -> Result<()> {
    let videos = VideoList::new(JsonStore::new(&config.storage.videos_json));

    match action {
        VideoCommands::List => {
            for v in videos.list()? {
                println!("{}  {}", v.embed_url, v.title);
            }
        }
        VideoCommands::Add { title, url } => {
            let video = videos.add(&title, &url)?;
            println!("Added {} ({})", video.title, video.embed_url);
        }
    }

    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output, force } => {
            write_default_config(&output, force)?;
            println!("Wrote default configuration to {:?}", output);
        }
    }
    Ok(())
}

fn write_default_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(ArchescanError::Config(format!(
            "{:?} already exists (use --force to overwrite)",
            output
        )));
    }
    AppConfig::default().save(output)
}

async fn run_status(config: AppConfig) -> Result<()> {
    println!("Model:      {}", config.ai.model);
    println!("Endpoint:   {}", config.ai.url);

    if !config.ai_enabled() {
        println!("AI:         disabled (GEMINI_API_KEY not set)");
    } else if let Some(client) = GeminiClient::from_config(&config.ai)? {
        match client.health_check().await {
            Ok(()) => println!("AI:         reachable"),
            Err(e) => println!("AI:         unavailable ({})", e),
        }
    }

    let catalog = ArtifactCatalog::open(&config.storage, Annotator::disabled(), config.prompts.clone())?;
    let gallery = Gallery::open(&config.storage.gallery_dir)?;
    let videos = VideoList::new(JsonStore::new(&config.storage.videos_json));

    println!("Artifacts:  {} in {:?}", catalog.list()?.len(), config.storage.artifacts_json);
    println!("Gallery:    {} photos in {:?}", gallery.photos()?.len(), gallery.root());
    println!("Videos:     {} in {:?}", videos.list()?.len(), config.storage.videos_json);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["archescan"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::try_parse_from(["archescan", "serve", "-H", "127.0.0.1", "--port", "8080"]).unwrap();

        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(8080));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_artifact_delete_command() {
        let cli = Cli::try_parse_from(["archescan", "artifacts", "delete", "mask.jpg", "-v"]).unwrap();
        assert!(cli.verbose);

        match cli.command {
            Some(Commands::Artifacts { action: ArtifactCommands::Delete { filename } }) => {
                assert_eq!(filename, "mask.jpg");
            }
            _ => panic!("Expected Artifacts Delete command"),
        }
    }

    #[test]
    fn test_cli_videos_add_command() {
        let cli = Cli::try_parse_from([
            "archescan", "videos", "add", "Dig tour", "https://youtu.be/abc",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Videos { action: VideoCommands::Add { title, url } }) => {
                assert_eq!(title, "Dig tour");
                assert_eq!(url, "https://youtu.be/abc");
            }
            _ => panic!("Expected Videos Add command"),
        }
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().web.port, 5000);
    }
}
