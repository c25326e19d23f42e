//! Build automation tasks for NOVA-380
//!
//! Usage:
//!   cargo xtask gen-map         # Generate the demo level asset
//!   cargo xtask build-web       # Build WASM for web deployment
//!   cargo xtask package-itch    # Create zip for itch.io upload

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nova380::asset::{tile_flags, TilemapAsset};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for NOVA-380")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the demo level under assets/demo/
    GenMap,
    /// Build WASM for web deployment (GitHub Pages)
    BuildWeb {
        /// Mark as dev build (adds DEV banner to index.html)
        #[arg(long)]
        dev: bool,
    },
    /// Create zip file ready for itch.io upload
    PackageItch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenMap => gen_map(),
        Commands::BuildWeb { dev } => build_web(dev),
        Commands::PackageItch => package_itch(),
    }
}

/// Get the project root directory
fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Download a file from URL to destination
fn download_file(url: &str, dest: &Path) -> Result<()> {
    println!("Downloading {}...", url);
    run_cmd(
        Command::new("curl")
            .args(["-L", "-o"])
            .arg(dest)
            .arg(url),
    )
}

/// Generate the demo level and write it through the asset pipeline, so the
/// shipped file is the same compressed RON the engine loads
fn gen_map() -> Result<()> {
    let cols: usize = 96;
    let rows: usize = 28;
    let mut tiles = vec![0u8; cols * rows];
    let mut coll = vec![0u8; cols * rows];

    let mut block = |x: usize, y: usize, tile: u8, flags: u8| {
        tiles[y * cols + x] = tile;
        coll[y * cols + x] = flags;
    };

    // Rolling ground: the surface row drifts between 22 and 24, with two
    // pits the player has to jump
    let pits = [(24usize..28), (60usize..65)];
    for x in 0..cols {
        if pits.iter().any(|p| p.contains(&x)) {
            continue;
        }
        let surface = 24 - ((x / 8) % 3);
        block(x, surface, 2, tile_flags::SOLID);
        for y in (surface + 1)..rows {
            block(x, y, 1, tile_flags::SOLID);
        }
    }

    // Spikes on the first pit floor
    for x in 24..28 {
        block(x, rows - 1, 5, tile_flags::HAZARD);
    }

    // One-way platforms: low steps off the ground, higher steps off those,
    // and a long one bridging the second pit
    for (start, end, row) in [
        (10, 15, 20),
        (18, 23, 17),
        (30, 35, 20),
        (36, 40, 18),
        (52, 57, 20),
        (58, 67, 17),
        (70, 75, 20),
        (74, 78, 17),
    ] {
        for x in start..end {
            block(x, row, 3, tile_flags::PLATFORM);
        }
    }

    // Tower walls, each crossed from the platform beside it
    for y in 18..24 {
        block(40, y, 4, tile_flags::SOLID);
    }
    for y in 17..24 {
        block(78, y, 4, tile_flags::SOLID);
    }

    let asset = TilemapAsset::new("runway", cols as u16, rows as u16, 512, 1, tiles)?
        .with_collision(coll)?;

    let dir = project_root().join("assets/demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("runway.ron");
    asset.save(&path)?;

    println!("Wrote {}", path.display());
    Ok(())
}

/// Build WASM for web deployment
fn build_web(dev: bool) -> Result<()> {
    let root = project_root();
    let dist = root.join("dist/web");

    println!("Building WASM...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["build", "--release", "--target", "wasm32-unknown-unknown"]),
    )?;

    // Clean and create dist folder
    if dist.exists() {
        std::fs::remove_dir_all(&dist)?;
    }
    std::fs::create_dir_all(&dist)?;

    // Copy WASM binary
    println!("Copying files to dist/web...");
    std::fs::copy(
        root.join("target/wasm32-unknown-unknown/release/nova-380.wasm"),
        dist.join("nova-380.wasm"),
    )?;

    // Copy the web shell
    let docs = root.join("docs");
    std::fs::copy(docs.join("index.html"), dist.join("index.html"))?;

    // Download macroquad JS bundle
    let mq_js = dist.join("mq_js_bundle.js");
    if !mq_js.exists() {
        download_file(
            "https://raw.githubusercontent.com/not-fl3/macroquad/v0.4.14/js/mq_js_bundle.js",
            &mq_js,
        )?;
    }

    // Apply dev modifications if requested
    if dev {
        println!("Applying DEV build modifications...");
        let index_path = dist.join("index.html");
        let index = std::fs::read_to_string(&index_path)?;
        let index = index
            .replace("Loading NOVA-380", "Loading NOVA-380 (DEV)")
            .replace("<title>NOVA-380", "<title>[DEV] NOVA-380");
        std::fs::write(&index_path, index)?;
    }

    println!("Web build complete: dist/web/");
    Ok(())
}

/// Create zip for itch.io
fn package_itch() -> Result<()> {
    // First build web
    build_web(false)?;

    let root = project_root();
    let dist = root.join("dist");
    let zip_path = dist.join("nova-380-itch.zip");

    // Remove old zip if exists
    if zip_path.exists() {
        std::fs::remove_file(&zip_path)?;
    }

    println!("Creating itch.io zip...");
    run_cmd(
        Command::new("zip")
            .current_dir(dist.join("web"))
            .args(["-r", "../nova-380-itch.zip", "."]),
    )?;

    println!("itch.io package ready: dist/nova-380-itch.zip");
    Ok(())
}
