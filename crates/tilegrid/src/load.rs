//! File loaders built on the `image` crate, and the end-to-end run.

use std::path::{Path, PathBuf};

use crate::classify::{
    ClassificationResult, ClassifierParams, ClassifyError, ClassifyReport, TemplateSource,
    TileClassifier,
};
use crate::core::{RgbImage, RgbImageView};
use crate::templates::{
    load_manifest, ExclusionReason, LibraryError, ManifestError, TemplateLibrary,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the loaders.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Decode any supported image file into an RGB buffer.
pub fn load_rgb_image(path: impl AsRef<Path>) -> Result<RgbImage, LoadError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| LoadError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_image_rgb(img.to_rgb8()))
}

/// Take ownership of an `image::RgbImage` buffer.
pub fn from_image_rgb(img: image::RgbImage) -> RgbImage {
    let (width, height) = img.dimensions();
    RgbImage {
        width: width as usize,
        height: height as usize,
        data: img.into_raw(),
    }
}

/// Borrow an `image::RgbImage` as a core view.
pub fn rgb_view(img: &image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Load `dir/tile{i}.png` for `i` in `0..count`.
///
/// Unreadable files and wrongly sized templates are excluded (with a
/// warning), never fatal.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))
)]
pub fn load_templates_from_dir(
    dir: impl AsRef<Path>,
    count: u32,
    cell_w: usize,
    cell_h: usize,
) -> Result<TemplateLibrary, LoadError> {
    let dir = dir.as_ref();
    let mut library = TemplateLibrary::new(cell_w, cell_h);
    for id in 0..count {
        let name = format!("tile{id}.png");
        match load_rgb_image(dir.join(&name)) {
            Ok(img) => {
                library.insert(id, name, img, None)?;
            }
            Err(err) => library.exclude(
                id,
                name,
                ExclusionReason::Unreadable {
                    message: err.to_string(),
                },
            ),
        }
    }
    log::debug!(
        "loaded {} of {} template(s) from {}",
        library.len(),
        count,
        dir.display()
    );
    Ok(library)
}

/// Load templates listed in a manifest, reusing its precomputed coarse
/// histograms. File names resolve against the manifest's directory.
///
/// A missing or malformed manifest is an error; individual templates
/// degrade as in [`load_templates_from_dir`]. Entries whose declared size
/// does not match the cell are excluded without decoding.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))
)]
pub fn load_templates_from_manifest(
    path: impl AsRef<Path>,
    cell_w: usize,
    cell_h: usize,
) -> Result<TemplateLibrary, LoadError> {
    let path = path.as_ref();
    let entries = load_manifest(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut library = TemplateLibrary::new(cell_w, cell_h);
    for entry in entries {
        if (entry.width, entry.height) != (cell_w, cell_h) {
            library.exclude(
                entry.id,
                entry.file,
                ExclusionReason::SizeMismatch {
                    width: entry.width,
                    height: entry.height,
                    cell_w,
                    cell_h,
                },
            );
            continue;
        }
        match load_rgb_image(base.join(&entry.file)) {
            Ok(img) => {
                library.insert(entry.id, entry.file, img, Some(entry.coarse))?;
            }
            Err(err) => library.exclude(
                entry.id,
                entry.file,
                ExclusionReason::Unreadable {
                    message: err.to_string(),
                },
            ),
        }
    }
    Ok(library)
}

/// Load a template library for cells of the given size.
pub fn load_templates(
    source: &TemplateSource,
    cell_w: usize,
    cell_h: usize,
) -> Result<TemplateLibrary, LoadError> {
    match source {
        TemplateSource::Directory { dir, count } => {
            load_templates_from_dir(dir, *count, cell_w, cell_h)
        }
        TemplateSource::Manifest { path } => load_templates_from_manifest(path, cell_w, cell_h),
    }
}

/// Everything one end-to-end run produced.
#[derive(Debug)]
pub struct ScreenshotRun {
    pub image_width: usize,
    pub image_height: usize,
    pub library: TemplateLibrary,
    pub result: ClassificationResult,
}

impl ScreenshotRun {
    pub fn report(&self, image_path: impl Into<String>) -> ClassifyReport {
        ClassifyReport::from_result(
            image_path,
            (self.image_width, self.image_height),
            &self.library,
            &self.result,
        )
    }
}

/// Decode the screenshot, load templates sized to its cells, classify.
///
/// Fails only when the screenshot cannot be decoded or partitioned, or
/// the manifest itself is unusable.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(image = %image_path.as_ref().display()))
)]
pub fn classify_screenshot(
    image_path: impl AsRef<Path>,
    templates: &TemplateSource,
    params: ClassifierParams,
) -> Result<ScreenshotRun, LoadError> {
    let image = load_rgb_image(image_path)?;
    let geometry = params
        .grid
        .geometry(image.width, image.height)
        .map_err(ClassifyError::from)?;
    let library = load_templates(templates, geometry.cell_w, geometry.cell_h)?;
    if library.is_empty() {
        log::warn!("no usable templates; unmatched cells will be unresolved");
    }

    let classifier = TileClassifier::new(&library, params);
    let result = classifier.classify(&image.view())?;
    Ok(ScreenshotRun {
        image_width: image.width,
        image_height: image.height,
        library,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TileType;
    use std::fs;

    fn save_solid(path: &Path, w: u32, h: u32, rgb: [u8; 3]) {
        image::RgbImage::from_pixel(w, h, image::Rgb(rgb))
            .save(path)
            .unwrap();
    }

    #[test]
    fn directory_loader_skips_missing_and_mismatched() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(&dir.path().join("tile0.png"), 8, 8, [10, 10, 10]);
        save_solid(&dir.path().join("tile2.png"), 8, 9, [20, 20, 20]);
        save_solid(&dir.path().join("tile3.png"), 8, 8, [30, 30, 30]);

        let lib = load_templates_from_dir(dir.path(), 4, 8, 8).unwrap();
        assert_eq!(lib.ids().collect::<Vec<_>>(), vec![0, 3]);
        let excluded: Vec<u32> = lib.excluded().iter().map(|e| e.id).collect();
        assert_eq!(excluded, vec![1, 2]);
        assert!(matches!(
            lib.excluded()[0].reason,
            ExclusionReason::Unreadable { .. }
        ));
        assert!(matches!(
            lib.excluded()[1].reason,
            ExclusionReason::SizeMismatch { height: 9, .. }
        ));
    }

    #[test]
    fn manifest_loader_uses_precomputed_histograms() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(&dir.path().join("tile7.png"), 8, 8, [10, 10, 10]);
        save_solid(&dir.path().join("tile9.png"), 8, 8, [10, 10, 10]);
        fs::write(
            dir.path().join("manifest.txt"),
            "# file w h black brown white other\n\
             tile7.png 8 8 1 2 3 58\n\
             tile9.png 4 4 16 0 0 0\n\
             tile11.png 8 8 64 0 0 0\n",
        )
        .unwrap();

        let lib = load_templates_from_manifest(dir.path().join("manifest.txt"), 8, 8).unwrap();
        assert_eq!(lib.ids().collect::<Vec<_>>(), vec![7]);
        let coarse = lib.get(7).unwrap().coarse;
        assert_eq!((coarse.black, coarse.brown, coarse.white, coarse.other), (1, 2, 3, 58));
        assert_eq!(lib.excluded().len(), 2);
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.txt");
        fs::write(&path, "tile0.png 8 8 1 2\n").unwrap();
        assert!(matches!(
            load_templates_from_manifest(&path, 8, 8),
            Err(LoadError::Manifest(ManifestError::FieldCount { line: 1, found: 5 }))
        ));
    }

    #[test]
    fn unreadable_screenshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let shot = dir.path().join("missing.png");
        let err = classify_screenshot(
            &shot,
            &TemplateSource::Directory {
                dir: dir.path().to_string_lossy().into_owned(),
                count: 1,
            },
            ClassifierParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Image { .. }));
    }

    #[test]
    fn end_to_end_from_files() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(&dir.path().join("tile7.png"), 10, 10, [30, 150, 40]);
        let shot = dir.path().join("shot.png");
        save_solid(&shot, 30, 40, [30, 150, 40]);

        let mut params = ClassifierParams::default();
        params.grid = crate::GridSpec::new(4, 3).unwrap();
        let source = TemplateSource::Directory {
            dir: dir.path().to_string_lossy().into_owned(),
            count: 8,
        };
        let run = classify_screenshot(&shot, &source, params).unwrap();
        assert_eq!(run.library.len(), 1);
        assert_eq!(run.result.matrix.get(3, 2), Some(TileType::Floor.into()));

        let report = run.report(shot.to_string_lossy());
        assert_eq!(report.matrix[0], vec![1, 1, 1]);
        assert_eq!(report.matrix[3], vec![0, 0, 0]);
        assert_eq!(report.excluded_templates.len(), 7);
    }
}
