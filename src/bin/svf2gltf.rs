//! Thin CLI wiring the core SVF→glTF pipeline end to end (spec §6).
//!
//! The real tool fetches a derivative's assets from the APS Model
//! Derivative API by urn/guid; that HTTP/auth surface is out of scope for
//! this crate (spec §1), so this binary reads the same asset shapes off a
//! local directory instead, through `LocalDirFetcher`. It exists to make
//! the pipeline runnable and testable, not to reimplement the real tool's
//! network boundary.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use svf2gltf::gltf::{GltfWriter, WriterConfig};
use svf2gltf::imf::SvfToImfAdapter;
use svf2gltf::svf::{LocalDirFetcher, SvfManifest, SvfReader};

/// Translate an SVF asset bundle into glTF 2.0.
#[derive(Parser, Debug)]
#[command(name = "svf2gltf", version, about)]
struct Cli {
    /// Directory holding one SVF asset bundle (manifest.json, metadata.json,
    /// *.pf packfiles, materials.json.gz, images), in lieu of a real APS
    /// urn/guid fetch.
    #[arg(long)]
    asset_dir: PathBuf,

    /// Directory the glTF manifest, buffers, and copied images are written to.
    #[arg(long)]
    output_folder: PathBuf,

    /// Enable content-addressed dedup of accessors/bufferViews/meshes/materials.
    #[arg(long)]
    deduplicate: bool,

    /// Translate the scene so its world bbox center sits at the origin.
    #[arg(long)]
    center: bool,

    /// Disable the axis-reorientation root node (on by default when the
    /// source metadata carries up/front axis hints).
    #[arg(long)]
    no_reorient: bool,

    /// Soft cap, in bytes, on any single `*.bin` buffer file.
    #[arg(long, default_value_t = 5 * 1024 * 1024)]
    max_buffer_size: u32,

    /// Omit UV buffers when no referenced material samples a UV.
    #[arg(long)]
    skip_unused_uvs: bool,

    /// Skip triangle-mesh geometry.
    #[arg(long)]
    ignore_meshes: bool,

    /// Skip polyline geometry.
    #[arg(long)]
    ignore_lines: bool,

    /// Skip point-cloud geometry.
    #[arg(long)]
    ignore_points: bool,

    /// Restrict output to objects whose dbID is in this set. May be repeated.
    #[arg(long = "filter-db-id")]
    filter_db_ids: Vec<u32>,

    /// Also write `output.metadata.json`, a dump of the source SVF metadata.
    #[arg(long)]
    dump_metadata: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let fetcher = LocalDirFetcher::new(&cli.asset_dir);

    let manifest_bytes = tokio::fs::read(cli.asset_dir.join("manifest.json"))
        .await
        .map_err(|e| anyhow::Error::new(e).context(format!("reading manifest.json under {}", cli.asset_dir.display())))?;
    let manifest: SvfManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| anyhow::Error::new(e).context("parsing manifest.json"))?;

    let svf = SvfReader::read(&fetcher, &manifest)
        .await
        .map_err(|e| anyhow::Error::new(e).context("reading SVF asset bundle"))?;

    let scene = SvfToImfAdapter::new(&svf);

    let config = WriterConfig {
        deduplicate: cli.deduplicate,
        skip_unused_uvs: cli.skip_unused_uvs,
        center: cli.center,
        reorient: !cli.no_reorient,
        max_buffer_size: cli.max_buffer_size,
        filter_db_ids: if cli.filter_db_ids.is_empty() {
            None
        } else {
            Some(cli.filter_db_ids.iter().copied().collect::<HashSet<_>>())
        },
        ignore_meshes: cli.ignore_meshes,
        ignore_lines: cli.ignore_lines,
        ignore_points: cli.ignore_points,
        dump_metadata: cli.dump_metadata,
    };

    let writer = GltfWriter::new(&cli.output_folder, config);
    writer.write(&scene).map_err(|e| anyhow::Error::new(e).context("writing glTF output"))?;

    log::info!("wrote glTF output to {}", cli.output_folder.display());
    Ok(())
}
