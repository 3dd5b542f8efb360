//! OSRM dataset preparation for integration tests (download + preprocess).
//!
//! The extract is fetched from Geofabrik once and preprocessed with the
//! `osrm/osrm-backend` image; later runs reuse the files on disk.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Geofabrik region path, e.g. "europe/monaco".
#[derive(Debug, Clone)]
pub struct Region(pub String);

impl Region {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("filesystem: {0}")]
    Io(#[from] io::Error),
    #[error("download: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Process(String),
}

/// A region preprocessed for the MLD algorithm.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

impl Dataset {
    pub fn osrm_file(&self) -> String {
        file_name(&self.osrm_base)
    }

    /// Seconds since the epoch of the last preprocessing run, for naming
    /// reusable containers.
    pub fn built_at(&self) -> u64 {
        fs::metadata(self.osrm_base.with_extension("osrm.partition"))
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs())
            .unwrap_or(0)
    }

    pub fn ensure(region: &Region, data_root: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let data_root = data_root.as_ref();
        let data_root = if data_root.is_absolute() {
            data_root.to_path_buf()
        } else {
            std::env::current_dir()?.join(data_root)
        };
        let data_dir = data_root.join(region.name());
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", region.name()));
        if !pbf_path.exists() {
            download(&region.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", region.name()));
        if !osrm_base.exists() {
            let pbf = format!("/data/{}", file_name(&pbf_path));
            run_docker(&["osrm-extract", "-p", "/opt/car.lua", &pbf], &data_dir)?;
        }

        if !mld_ready(&osrm_base) {
            let base = format!("/data/{}", file_name(&osrm_base));
            run_docker(&["osrm-partition", &base], &data_dir)?;
            run_docker(&["osrm-customize", &base], &data_dir)?;
        }

        Ok(Self { data_dir, osrm_base })
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
        && osrm_base.exists()
}

fn run_docker(args: &[&str], data_dir: &Path) -> Result<(), DatasetError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Process(format!("docker exited with status {}", status)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
