use walkdir::{WalkDir, DirEntry};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::media::mimetype;

/// Expands the given paths into the list of images to classify.
///
/// Files named explicitly are always kept, even if they turn out not to be
/// images; the classifier reports those. Directories are walked recursively
/// and only contribute files that sniff as a supported raster format;
/// unreadable entries are skipped with a warning.
pub fn collect_images(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for root in roots {
        if root.is_dir() {
            scan_directory(root, &mut images);
        } else {
            images.push(root.clone());
        }
    }
    images
}

fn scan_directory(root: &Path, out: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(root).sort_by_file_name().into_iter();

    for entry in walker.filter_entry(|e| e.depth() == 0 || !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match mimetype::detect_mimetype(entry.path()) {
            Ok(mime) if mimetype::is_supported_image(&mime) => out.push(entry.into_path()),
            Ok(mime) => warn!("Skipping {:?} ({})", entry.path(), mime),
            Err(e) => warn!("Skipping {:?}: {:#}", entry.path(), e),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name()
         .to_str()
         .map(|s| s.starts_with('.'))
         .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::fs;

    fn write_png(path: &Path) -> Result<()> {
        DynamicImage::ImageRgb8(RgbImage::new(8, 8)).save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    #[test]
    fn test_collects_images_recursively_and_skips_hidden() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("site_b");
        let hidden = dir.path().join(".cache");
        fs::create_dir(&nested)?;
        fs::create_dir(&hidden)?;

        write_png(&dir.path().join("a.png"))?;
        write_png(&nested.join("b.png"))?;
        write_png(&hidden.join("c.png"))?;
        write_png(&dir.path().join(".d.png"))?;
        fs::write(dir.path().join("readme.txt"), "field notes")?;

        let found = collect_images(&[dir.path().to_path_buf()]);
        assert_eq!(found, vec![dir.path().join("a.png"), nested.join("b.png")]);
        Ok(())
    }

    #[test]
    fn test_explicit_files_are_kept() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "not an image")?;

        let found = collect_images(&[notes.clone()]);
        assert_eq!(found, vec![notes]);
        Ok(())
    }

    #[test]
    fn test_walk_errors_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_png(&dir.path().join("kept.png"))?;

        let mut found = Vec::new();
        scan_directory(&dir.path().join("vanished"), &mut found);
        assert!(found.is_empty());

        scan_directory(dir.path(), &mut found);
        assert_eq!(found, vec![dir.path().join("kept.png")]);
        Ok(())
    }
}
