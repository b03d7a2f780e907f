//! Batch directory conversion.
//!
//! Per-file failure is isolated: a malformed asset is recorded and the rest
//! of the batch continues. Files are independent, so the batch fans out
//! across a thread pool; results are aggregated per file.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;
use walkdir::WalkDir;

use crate::convert::{convert_file, ConvertOptions, TargetFormat};
use crate::manifest::AssetManifest;
use crate::ps3::ps3_ctxr_to_dds;
use crate::{output, Error, Result};

/// A directory conversion job.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Format to convert every matching file to.
    pub target: TargetFormat,
    /// Per-asset tags; unlisted assets use the defaults.
    pub manifest: AssetManifest,
    /// Directory holding companion CTXR templates (required when the target
    /// is CTXR).
    pub template_dir: Option<PathBuf>,
    /// Template DDS header for PS3 conversions, already loaded.
    pub dds_template: Option<Vec<u8>>,
    /// Append the fixed trailer to TGA exports.
    pub tga_footer: bool,
    /// Treat sources as PS3-build CTXR assets (target must be DDS).
    pub ps3: bool,
}

impl BatchJob {
    /// A job converting to `target` with default options.
    pub fn new(target: TargetFormat) -> Self {
        Self {
            target,
            manifest: AssetManifest::default(),
            template_dir: None,
            dds_template: None,
            tga_footer: false,
            ps3: false,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        self.target.source_extensions().contains(&ext.as_str())
    }

    fn run_one(&self, source: &Path, input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
        let relative = source.strip_prefix(input_dir).unwrap_or(source);
        let dest = output_dir
            .join(relative)
            .with_extension(self.target.extension());
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.ps3 {
            let data = fs::read(source)?;
            let converted =
                ps3_ctxr_to_dds(&data, self.manifest.is_swizzled(&file_name), self.dds_template.as_deref())?;
            output::commit(&dest, &converted)?;
            return Ok(dest);
        }

        let template = match self.target {
            TargetFormat::Ctxr => {
                let dir = self.template_dir.as_ref().ok_or_else(|| {
                    Error::Configuration(
                        "a template directory is required when writing CTXR".into(),
                    )
                })?;
                let template = dir.join(&file_name).with_extension("ctxr");
                if !template.is_file() {
                    return Err(Error::Configuration(format!(
                        "no CTXR template for {file_name}"
                    )));
                }
                Some(template)
            }
            _ => None,
        };

        let options = ConvertOptions {
            layout: Some(self.manifest.layout_for(&file_name)),
            template,
            tga_footer: self.tga_footer,
        };
        convert_file(source, &dest, self.target, &options)
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of files converted successfully.
    pub succeeded: usize,
    /// `(file name, error message)` for every failed file.
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    /// Total number of files processed.
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

/// Convert every matching file under `input_dir` into `output_dir`.
///
/// Relative directory structure is preserved. `progress` is called once per
/// completed file (from worker threads). Per-asset errors are collected into
/// the report, never raised; only failing to walk the input directory or
/// create the output directory fails the call itself.
pub fn convert_directory<F>(
    input_dir: &Path,
    output_dir: &Path,
    job: &BatchJob,
    progress: F,
) -> Result<BatchReport>
where
    F: Fn(&Path) + Sync,
{
    let sources: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| job.accepts(path))
        .collect();

    fs::create_dir_all(output_dir)?;

    let results: Vec<(String, std::result::Result<PathBuf, String>)> = sources
        .par_iter()
        .map(|source| {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = job
                .run_one(source, input_dir, output_dir)
                .map_err(|e| e.to_string());
            progress(source);
            (name, result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (name, result) in results {
        match result {
            Ok(_) => report.succeeded += 1,
            Err(message) => {
                warn!(file = %name, error = %message, "conversion failed");
                report.failures.push((name, message));
            }
        }
    }
    Ok(report)
}
