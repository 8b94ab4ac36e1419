// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! seglab command line entry point.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use seglab::config::{bind_addr, Config};
use seglab::io::library::ImageLibrary;
use seglab::models::frame::GALLERY_EXTENSIONS;
use seglab::server::{self, annotate, gallery};
use seglab::util::geometry::GridLayout;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seglab", version, about = "Segmentation mask editor and image gallery")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the mask editor over a dataset folder
    Annotate {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Root holding train/ and val/
        #[arg(long)]
        dataset_dir: Option<PathBuf>,
    },
    /// Serve the image gallery over a flat folder
    Gallery {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },
    /// Print the wall grid layout for a frame size as JSON
    Grid {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    match cli.command {
        Command::Annotate {
            host,
            port,
            dataset_dir,
        } => {
            let mut settings = config.annotate;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(dir) = dataset_dir {
                settings.dataset_dir = dir;
            }

            let addr = bind_addr(&settings.host, settings.port)?;
            log::info!("Dataset root: {}", settings.dataset_dir.display());
            server::serve(annotate::router(&settings), addr, "Annotation server").await
        }
        Command::Gallery {
            host,
            port,
            images_dir,
        } => {
            let mut settings = config.gallery;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(dir) = images_dir {
                settings.images_dir = dir;
            }

            let addr = bind_addr(&settings.host, settings.port)?;
            let library = ImageLibrary::open(&settings.images_dir, GALLERY_EXTENSIONS)?;
            server::serve(gallery::router(library, &settings), addr, "Gallery").await
        }
        Command::Grid { width, height } => {
            if width == 0 || height == 0 {
                bail!("Width and height must be positive");
            }
            let layout = GridLayout::new(width, height);
            let json = serde_json::to_string_pretty(&layout).context("Failed to encode layout")?;
            println!("{json}");
            Ok(())
        }
    }
}
