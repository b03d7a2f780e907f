//! Single-file conversion jobs.
//!
//! Raw CTXR payloads are BGRA; DDS, PNG and BMP want RGBA, so raw paths go
//! through the byte-0/2 swap in both directions. DXT5 payloads are moved
//! untouched: this converter never encodes or decodes block compression.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use retex_common::BinaryReader;
use retex_ctxr::pixel::{swap_channels_02, swapped_channels_02};
use retex_ctxr::{level_dimensions, CtxrFile, PixelLayout};
use retex_dds::{DdsFormat, DDS_FILE_HEADER_SIZE};
use tracing::info;

use crate::output;
use crate::tga::{parse_tga, write_tga};
use crate::{Error, Result};

/// Interchange formats a conversion can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Dds,
    Tga,
    Png,
    Bmp,
    Ctxr,
}

impl TargetFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Dds => "dds",
            TargetFormat::Tga => "tga",
            TargetFormat::Png => "png",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Ctxr => "ctxr",
        }
    }

    /// Source extensions a conversion to this target accepts.
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            TargetFormat::Ctxr => &["dds", "tga", "png", "bmp", "jpg", "jpeg"],
            _ => &["ctxr"],
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Per-call conversion options.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Payload layout of the CTXR asset involved (from the manifest).
    pub layout: Option<PixelLayout>,
    /// Companion template: a CTXR file when targeting CTXR, a DDS header
    /// when targeting DDS.
    pub template: Option<PathBuf>,
    /// Append the fixed 32-byte trailer to TGA exports.
    pub tga_footer: bool,
}

impl ConvertOptions {
    fn layout_or_default(&self) -> PixelLayout {
        self.layout.unwrap_or(PixelLayout::Rgba8)
    }
}

/// Convert CTXR bytes to a DDS file.
///
/// Raw payloads are channel-swapped to RGBA; DXT5 payloads pass through.
/// Mip payloads follow the main payload back-to-back with no inter-level
/// padding. When a template header is given it is patched instead of
/// building one from scratch.
pub fn ctxr_to_dds(ctxr: &CtxrFile, dds_template: Option<&[u8]>) -> Result<Vec<u8>> {
    let level_count = u32::from(ctxr.header().mipmap_count()).max(1);
    let format = match ctxr.layout() {
        PixelLayout::Rgba8 => DdsFormat::Rgba8,
        PixelLayout::Dxt5 => DdsFormat::Dxt5,
    };

    let header = match dds_template {
        Some(template) => {
            retex_dds::patch(template, ctxr.width(), ctxr.height(), level_count, format)?
        }
        None => retex_dds::build(ctxr.width(), ctxr.height(), level_count, format),
    };

    let mut out = Vec::with_capacity(DDS_FILE_HEADER_SIZE + ctxr.pixel_data().len());
    out.extend_from_slice(&header);
    match ctxr.layout() {
        PixelLayout::Rgba8 => {
            out.extend_from_slice(&swapped_channels_02(ctxr.pixel_data()));
            for level in ctxr.mip_levels() {
                out.extend_from_slice(&swapped_channels_02(&level.data));
            }
        }
        PixelLayout::Dxt5 => {
            out.extend_from_slice(ctxr.pixel_data());
            for level in ctxr.mip_levels() {
                out.extend_from_slice(&level.data);
            }
        }
    }
    Ok(out)
}

/// Convert a DDS file back into a CTXR asset.
///
/// The template provides the opaque header bytes and the chain structure;
/// only a DDS whose pixel format matches the asset's layout can be stored.
pub fn dds_to_ctxr(dds: &[u8], template: &CtxrFile) -> Result<Vec<u8>> {
    let info = retex_dds::parse(dds)?;
    let layout = match info.format {
        DdsFormat::Rgba8 => PixelLayout::Rgba8,
        DdsFormat::Dxt5 => PixelLayout::Dxt5,
        DdsFormat::Dxt1 => {
            return Err(Error::UnsupportedFormat(
                "CTXR stores raw RGBA8 or DXT5 payloads, not DXT1".into(),
            ))
        }
    };
    if layout != template.layout() {
        return Err(Error::UnsupportedFormat(format!(
            "asset expects a {:?} payload but the DDS is {:?}",
            template.layout(),
            info.format
        )));
    }

    let mut reader = BinaryReader::new_at(dds, DDS_FILE_HEADER_SIZE);
    let mut main = reader
        .read_bytes(layout.surface_size(info.width, info.height))?
        .to_vec();
    if layout == PixelLayout::Rgba8 {
        swap_channels_02(&mut main);
    }

    let mut mips = Vec::new();
    for level in 1..info.level_count() {
        let mut data = reader
            .read_bytes(layout.level_size(info.width, info.height, level))?
            .to_vec();
        if layout == PixelLayout::Rgba8 {
            swap_channels_02(&mut data);
        }
        mips.push(data);
    }

    let rebuilt = CtxrFile::from_template(
        template,
        info.width as u16,
        info.height as u16,
        main,
        mips,
        layout,
    );
    rebuilt.to_bytes().map_err(Error::from)
}

/// Export the main payload of a raw CTXR asset as 32-bit TGA.
///
/// CTXR and TGA both store BGRA, so the payload moves verbatim.
pub fn ctxr_to_tga(ctxr: &CtxrFile, with_footer: bool) -> Result<Vec<u8>> {
    if ctxr.layout().is_compressed() {
        return Err(Error::UnsupportedFormat(
            "DXT5 payloads cannot be exported to TGA without decompression".into(),
        ));
    }
    write_tga(
        ctxr.width() as u16,
        ctxr.height() as u16,
        ctxr.pixel_data(),
        with_footer,
    )
}

/// Export the main payload of a raw CTXR asset through the raster codec.
pub fn ctxr_to_raster(ctxr: &CtxrFile, format: image::ImageFormat) -> Result<Vec<u8>> {
    if ctxr.layout().is_compressed() {
        return Err(Error::UnsupportedFormat(
            "DXT5 payloads cannot be re-encoded as raster images without decompression".into(),
        ));
    }

    let expected = PixelLayout::Rgba8.surface_size(ctxr.width(), ctxr.height());
    if ctxr.pixel_data().len() != expected {
        return Err(Error::PayloadSizeMismatch {
            expected,
            actual: ctxr.pixel_data().len(),
        });
    }

    let rgba = swapped_channels_02(ctxr.pixel_data());
    let img = image::RgbaImage::from_raw(ctxr.width(), ctxr.height(), rgba)
        .expect("buffer length checked against dimensions");

    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)?;
    Ok(cursor.into_inner())
}

/// Build a CTXR asset from a decoded raster image.
///
/// The template supplies the header and chain structure. When it declares
/// mip levels they are regenerated by Lanczos downsampling, since raster
/// sources carry only the base image. Only raw-layout assets can be built
/// this way.
pub fn raster_to_ctxr(img: &image::DynamicImage, template: &CtxrFile) -> Result<Vec<u8>> {
    if template.layout().is_compressed() {
        return Err(Error::UnsupportedFormat(
            "cannot produce a DXT5 payload from a raster image; supply a DXT5 DDS instead".into(),
        ));
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut main = rgba.as_raw().clone();
    swap_channels_02(&mut main);

    let levels = u32::from(template.header().mipmap_count()).max(1) - 1;
    let mut mips = Vec::with_capacity(levels as usize);
    for level in 1..=levels {
        let (mip_w, mip_h) = level_dimensions(width, height, level);
        let resized = image::imageops::resize(&rgba, mip_w, mip_h, FilterType::Lanczos3);
        let mut data = resized.into_raw();
        swap_channels_02(&mut data);
        mips.push(data);
    }

    let rebuilt = CtxrFile::from_template(
        template,
        width as u16,
        height as u16,
        main,
        mips,
        PixelLayout::Rgba8,
    );
    rebuilt.to_bytes().map_err(Error::from)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn load_ctxr_template(options: &ConvertOptions, layout: PixelLayout) -> Result<CtxrFile> {
    let path = options.template.as_ref().ok_or_else(|| {
        Error::Configuration(
            "a companion CTXR header template is required when writing CTXR".into(),
        )
    })?;
    CtxrFile::open(path, layout).map_err(Error::from)
}

/// Convert one file.
///
/// `source` and `target` decide the direction; `options` carries the asset
/// layout and any companion template. The output is committed atomically
/// and the destination path returned. Failures leave no partial output.
pub fn convert_file(
    source: &Path,
    dest: &Path,
    target: TargetFormat,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    let bytes = fs::read(source)?;

    let out = match target {
        TargetFormat::Dds => {
            let ctxr = CtxrFile::parse(&bytes, options.layout_or_default())?;
            let template = options
                .template
                .as_ref()
                .map(fs::read)
                .transpose()?;
            ctxr_to_dds(&ctxr, template.as_deref())?
        }
        TargetFormat::Tga => {
            let ctxr = CtxrFile::parse(&bytes, options.layout_or_default())?;
            ctxr_to_tga(&ctxr, options.tga_footer)?
        }
        TargetFormat::Png => {
            let ctxr = CtxrFile::parse(&bytes, options.layout_or_default())?;
            ctxr_to_raster(&ctxr, image::ImageFormat::Png)?
        }
        TargetFormat::Bmp => {
            let ctxr = CtxrFile::parse(&bytes, options.layout_or_default())?;
            ctxr_to_raster(&ctxr, image::ImageFormat::Bmp)?
        }
        TargetFormat::Ctxr => match extension_of(source).as_str() {
            "dds" => {
                let info = retex_dds::parse(&bytes)?;
                let layout = match info.format {
                    DdsFormat::Dxt5 => PixelLayout::Dxt5,
                    _ => PixelLayout::Rgba8,
                };
                let template = load_ctxr_template(options, layout)?;
                dds_to_ctxr(&bytes, &template)?
            }
            "tga" => {
                let (tga, pixels) = parse_tga(&bytes)?;
                let rgba = swapped_channels_02(pixels);
                let img = image::RgbaImage::from_raw(
                    u32::from(tga.width),
                    u32::from(tga.height),
                    rgba,
                )
                .expect("parse_tga returns exactly width * height * 4 bytes");
                let template = load_ctxr_template(options, PixelLayout::Rgba8)?;
                raster_to_ctxr(&image::DynamicImage::ImageRgba8(img), &template)?
            }
            "png" | "bmp" | "jpg" | "jpeg" => {
                let img = image::load_from_memory(&bytes)?;
                let template = load_ctxr_template(options, PixelLayout::Rgba8)?;
                raster_to_ctxr(&img, &template)?
            }
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "cannot build CTXR from a .{other} file"
                )))
            }
        },
    };

    output::commit(dest, &out)?;
    info!(source = %source.display(), dest = %dest.display(), "converted");
    Ok(dest.to_path_buf())
}
