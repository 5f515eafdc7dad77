//! Chart packaging
//!
//! Packages a chart source directory into a versioned `.tgz` archive with
//! reproducible headers, and optionally registers the archive in the local
//! chart cache.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, Header};

use crate::chart::{Chart, LoadedChart};
use crate::error::{CoreError, Result};
use crate::version::Version;

/// Package a chart directory into `<dest>/<name>-<version>.tgz`.
///
/// The chart's declared version is overwritten with `version` before
/// anything is written. Hard preconditions, checked in order:
///
/// - the source directory's basename must equal the chart's declared name,
/// - every declared dependency must be vendored under `charts/`.
///
/// A `dest` of `"."` resolves to the current working directory. When
/// `save_local` is set the archive is additionally copied into the local
/// chart cache, keyed by name and version.
///
/// Returns the path of the written archive.
pub fn package_chart(
    src: &Path,
    version: Version,
    dest: &Path,
    save_local: bool,
) -> Result<PathBuf> {
    let mut loaded = LoadedChart::load(src)?;

    let dir_name = loaded.dir_name();
    if dir_name != loaded.chart.name {
        return Err(CoreError::ChartNameMismatch {
            directory: dir_name,
            chart: loaded.chart.name.clone(),
        });
    }

    loaded.check_dependencies()?;

    loaded.chart.version = version.to_string();

    let dest = if dest == Path::new(".") {
        std::env::current_dir()?
    } else {
        dest.to_path_buf()
    };
    std::fs::create_dir_all(&dest)?;

    let archive_name = format!("{}-{}.tgz", loaded.chart.name, version);
    let output = dest.join(&archive_name);

    write_archive(&loaded, &output)?;

    if save_local {
        let cache = local_cache_dir()?;
        std::fs::create_dir_all(&cache)?;
        std::fs::copy(&output, cache.join(&archive_name))?;
    }

    Ok(output)
}

/// Local chart cache directory (`~/.slipway/repository/local`)
pub fn local_cache_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CoreError::Archive {
        message: "could not determine home directory".to_string(),
    })?;
    Ok(home.join(".slipway").join("repository").join("local"))
}

fn write_archive(loaded: &LoadedChart, output: &Path) -> Result<()> {
    let file = File::create(output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    let prefix = &loaded.chart.name;

    // Chart.yaml is re-serialized so the archive carries the release version
    let chart_yaml = serde_yaml::to_string(&loaded.chart)?;
    add_bytes_to_archive(
        &mut builder,
        &format!("{}/Chart.yaml", prefix),
        chart_yaml.as_bytes(),
    )?;

    for entry in walkdir::WalkDir::new(&loaded.root)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let rel = path.strip_prefix(&loaded.root).unwrap_or(path);
        if rel == Path::new("Chart.yaml") {
            continue;
        }
        // Stale archives from previous packaging runs are not chart content
        if rel.extension().is_some_and(|ext| ext == "tgz") && rel.parent() == Some(Path::new("")) {
            continue;
        }

        let archive_path = format!("{}/{}", prefix, rel.to_string_lossy());
        let content = std::fs::read(path)?;
        add_bytes_to_archive(&mut builder, &archive_path, &content)?;
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;

    Ok(())
}

/// Add bytes to a tar archive with a given path
fn add_bytes_to_archive<W: Write>(
    builder: &mut Builder<W>,
    archive_path: &str,
    content: &[u8],
) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0); // Reproducible builds: use epoch time
    header.set_cksum();

    builder.append_data(&mut header, archive_path, content)?;

    Ok(())
}

/// Read the chart definition out of a packaged archive.
///
/// Looks for the conventional `<name>/Chart.yaml` entry.
pub fn read_chart_from_archive(archive_path: &Path) -> Result<Chart> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_path_buf();

        let is_chart_yaml = path.components().count() == 2
            && path.file_name().is_some_and(|n| n == "Chart.yaml");
        if !is_chart_yaml {
            continue;
        }

        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        return Ok(serde_yaml::from_str(&content)?);
    }

    Err(CoreError::Archive {
        message: format!("Chart.yaml not found in {}", archive_path.display()),
    })
}
