//! OSRM dataset preparation for integration tests.
//!
//! Downloads a Geofabrik extract and runs the osrm-backend docker tooling
//! (extract, partition, customize) so a routed instance can serve it with
//! the MLD algorithm. Every step is skipped when its outputs already exist.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DatasetError;

/// A prepared OSRM dataset on disk.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    /// Directory holding the extract and all derived files.
    pub data_dir: PathBuf,
    /// Base path of the preprocessed graph (`<region>-latest.osrm`).
    pub graph_base: PathBuf,
    pub pbf_path: PathBuf,
}

impl OsrmDataset {
    /// Ensure the dataset for `region` (a Geofabrik path such as
    /// `"asia/japan/kansai"`) exists under `data_root`, downloading and
    /// preprocessing as needed.
    pub fn ensure(region: &str, data_root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let name = region.rsplit('/').next().unwrap_or("region");
        let data_root = data_root.into();
        let data_root = if data_root.is_absolute() {
            data_root
        } else {
            std::env::current_dir()?.join(data_root)
        };
        let data_dir = data_root.join(name);
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{name}-latest.osm.pbf"));
        if !pbf_path.exists() {
            let url = format!("https://download.geofabrik.de/{region}-latest.osm.pbf");
            download(&url, &pbf_path)?;
        }

        let graph_base = data_dir.join(format!("{name}-latest.osrm"));
        if !graph_base.exists() {
            run_osrm_tool(
                &["osrm-extract", "-p", "/opt/car.lua", &in_container(&pbf_path)],
                &data_dir,
            )?;
        }
        if !mld_ready(&graph_base) {
            run_osrm_tool(&["osrm-partition", &in_container(&graph_base)], &data_dir)?;
            run_osrm_tool(&["osrm-customize", &in_container(&graph_base)], &data_dir)?;
        }

        Ok(Self {
            data_dir,
            graph_base,
            pbf_path,
        })
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(graph_base: &Path) -> bool {
    graph_base.exists()
        && ["osrm.partition", "osrm.mldgr", "osrm.cells"]
            .iter()
            .all(|ext| graph_base.with_extension(ext).exists())
}

fn in_container(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    format!("/data/{name}")
}

fn run_osrm_tool(args: &[&str], data_dir: &Path) -> Result<(), DatasetError> {
    let status = Command::new("docker")
        .arg("run")
        .arg("--rm")
        .arg("-t")
        .arg("-v")
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Process(format!(
            "{} exited with status {status}",
            args.first().unwrap_or(&"docker")
        )))
    }
}
