use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

#[inline]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Recursively lists the image files under `dir`, sorted by path.
///
/// A missing directory gives an empty listing.
pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, Error> {
    let dir = dir.as_ref();
    let mut images = Vec::new();

    match walk(dir, &mut images) {
        Err(Error::Io { ref source, .. }) if source.kind() == ErrorKind::NotFound => {
            tracing::debug!(?dir, "image folder does not exist");
            return Ok(Vec::new());
        }
        res => res?,
    }

    images.sort();
    Ok(images)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), Error> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();

        if path.is_dir() {
            walk(&path, out)?;
        } else if is_image(&path) {
            out.push(path);
        }
    }

    Ok(())
}
