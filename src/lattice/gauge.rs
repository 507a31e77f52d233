//! SU(3) gauge configurations stored as ILDG files in one directory.

use std::path::{Path, PathBuf};

use super::reader::{IldgFile, OpenedFile};
use super::types::element::ElementMetaData;
use super::types::error::Result;

/// Link matrix layout per site: direction, color row, color column.
const LINK_SHAPE: [usize; 3] = [4, 3, 3];

/// Naming and layout conventions of a gauge ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeFieldConfig {
    pub time_extent: usize,
    /// Sites per timeslice.
    pub spatial_volume: usize,
    pub dtype: String,
    /// File extension, without the dot.
    pub extension: String,
}

impl Default for GaugeFieldConfig {
    fn default() -> Self {
        Self {
            time_extent: 128,
            spatial_volume: 16 * 16 * 16,
            dtype: ">c16".to_string(),
            extension: "lime".to_string(),
        }
    }
}

impl GaugeFieldConfig {
    /// `[time, volume, direction, colorRow, colorCol]`.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![self.time_extent, self.spatial_volume];
        shape.extend_from_slice(&LINK_SHAPE);
        shape
    }
}

/// Looks up gauge configurations by name: `{directory}/{name}.{extension}`.
#[derive(Debug)]
pub struct GaugeField {
    directory: PathBuf,
    extension: String,
    element: ElementMetaData,
    reader: IldgFile,
}

impl GaugeField {
    /// Field identifier used in ILDG descriptors.
    pub const ID: &'static str = "su3gauge";

    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(directory, GaugeFieldConfig::default())
    }

    /// # Errors
    /// Fails if the configured dtype or shape is invalid.
    pub fn with_config(directory: impl AsRef<Path>, config: GaugeFieldConfig) -> Result<Self> {
        let element = ElementMetaData::new(config.shape(), &config.dtype, 0)?;
        Ok(Self {
            directory: directory.as_ref().to_path_buf(),
            extension: config.extension,
            element,
            reader: IldgFile::new(),
        })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", name, self.extension))
    }

    /// The element metadata every configuration is opened with.
    pub fn element(&self) -> &ElementMetaData {
        &self.element
    }

    /// Opens configuration `name`, reusing the handle if it is the one last opened.
    pub fn open(&mut self, name: &str) -> Result<&mut OpenedFile> {
        let path = self.path_for(name);
        self.reader.open(path, &self.element)
    }
}
