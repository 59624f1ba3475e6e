//! Grid export: raster image plus a ROS map_server style YAML sidecar.
//!
//! ## Files
//!
//! - `{stem}.png` / `{stem}.pgm`: 8-bit grayscale, occupied = 0, free = 255
//! - `{stem}.yaml`: resolution, origin and dimensions
//!
//! Grid row 0 is the minimum-Y edge while image row 0 is the top, so rows
//! are flipped on export. Without the flip the map comes out mirrored
//! north-south.
//!
//! Both files are written to a temporary file in the target directory and
//! renamed into place, image first. A reader that finds a sidecar can rely
//! on the image next to it being complete.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{MapError, Result};
use crate::grid::OccupancyGrid;

/// Pixel value for occupied cells.
pub const OCCUPIED_PIXEL: u8 = 0;

/// Pixel value for free cells.
pub const FREE_PIXEL: u8 = 255;

/// ROS map_server occupancy threshold written to the sidecar.
const OCCUPIED_THRESH: f64 = 0.65;

/// ROS map_server free threshold written to the sidecar.
const FREE_THRESH: f64 = 0.196;

/// Geometry of a built map, as served to the operator map view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Map-frame X of the grid's (0, 0) corner
    pub origin_x: f64,
    /// Map-frame Y of the grid's (0, 0) corner
    pub origin_y: f64,
    /// Meters per cell
    pub resolution: f64,
    /// Width in cells (= image width in pixels)
    pub width: usize,
    /// Height in cells (= image height in pixels)
    pub height: usize,
}

/// YAML sidecar layout (ROS-standard fields first).
#[derive(Clone, Debug, Serialize, Deserialize)]
struct MapSidecar {
    image: String,
    resolution: f64,
    origin: [f64; 3],
    #[serde(default)]
    negate: u8,
    occupied_thresh: f64,
    free_thresh: f64,
    width: usize,
    height: usize,
}

impl MapSidecar {
    fn new(meta: &MapMetadata, image_name: String) -> Self {
        Self {
            image: image_name,
            resolution: meta.resolution,
            origin: [meta.origin_x, meta.origin_y, 0.0],
            negate: 0,
            occupied_thresh: OCCUPIED_THRESH,
            free_thresh: FREE_THRESH,
            width: meta.width,
            height: meta.height,
        }
    }

    fn metadata(&self) -> MapMetadata {
        MapMetadata {
            origin_x: self.origin[0],
            origin_y: self.origin[1],
            resolution: self.resolution,
            width: self.width,
            height: self.height,
        }
    }
}

/// Render the grid as a top-up grayscale image.
pub fn to_image(grid: &OccupancyGrid) -> GrayImage {
    let height = grid.height();
    GrayImage::from_fn(grid.width() as u32, height as u32, |x, y| {
        let row = height - 1 - y as usize;
        if grid.is_occupied(x as usize, row) {
            Luma([OCCUPIED_PIXEL])
        } else {
            Luma([FREE_PIXEL])
        }
    })
}

/// Image format implied by the file extension (`.png` or `.pgm`).
pub fn image_format(path: &Path) -> Result<ImageFormat> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Pnm)) => Ok(format),
        _ => Err(MapError::InvalidConfig(format!(
            "unsupported map image extension: {}",
            path.display()
        ))),
    }
}

/// Sidecar path for an image path.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("yaml")
}

/// Encode the grid and atomically replace `path`.
pub fn save_image(grid: &OccupancyGrid, path: &Path) -> Result<()> {
    let format = image_format(path)?;
    let image = to_image(grid);
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        match format {
            // Binary graymap (P5), as ROS map_server expects.
            ImageFormat::Pnm => PnmEncoder::new(&mut writer)
                .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::L8,
                )?,
            _ => image.write_to(&mut writer, ImageFormat::Png)?,
        }
        writer.flush()?;
        Ok(())
    })
}

/// Write the metadata sidecar next to `image_path`.
pub fn write_sidecar(meta: &MapMetadata, image_path: &Path) -> Result<PathBuf> {
    let image_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sidecar = MapSidecar::new(meta, image_name);
    let path = sidecar_path(image_path);

    write_atomic(&path, |file| {
        let mut writer = BufWriter::new(file);
        writeln!(writer, "# Occupancy map saved by naksha")?;
        writeln!(writer, "# ROS map_server format with width/height extensions")?;
        serde_yaml::to_writer(&mut writer, &sidecar)?;
        writer.flush()?;
        Ok(())
    })?;
    Ok(path)
}

/// Read the sidecar next to `image_path`.
pub fn read_sidecar(image_path: &Path) -> Result<MapMetadata> {
    let content = fs::read_to_string(sidecar_path(image_path))?;
    let sidecar: MapSidecar = serde_yaml::from_str(&content)?;
    Ok(sidecar.metadata())
}

/// Export image then sidecar.
pub fn export_map(grid: &OccupancyGrid, image_path: &Path) -> Result<MapMetadata> {
    let meta = grid.metadata();
    save_image(grid, image_path)?;
    write_sidecar(&meta, image_path)?;
    Ok(meta)
}

/// Metadata of a previously exported map, if both files are present and
/// the sidecar agrees with the image header.
pub fn load_existing(image_path: &Path) -> Option<MapMetadata> {
    if !image_path.is_file() {
        return None;
    }
    let meta = match read_sidecar(image_path) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("Ignoring {}: {}", image_path.display(), e);
            return None;
        }
    };
    match image::image_dimensions(image_path) {
        Ok((w, h)) if w as usize == meta.width && h as usize == meta.height => Some(meta),
        Ok((w, h)) => {
            log::warn!(
                "Sidecar for {} says {}x{} but image is {}x{}",
                image_path.display(),
                meta.width,
                meta.height,
                w,
                h
            );
            None
        }
        Err(e) => {
            log::warn!("Unreadable map image {}: {}", image_path.display(), e);
            None
        }
    }
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| MapError::Io(e.error))?;
    Ok(())
}
