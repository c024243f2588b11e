use crate::bitmap::Bitmap;
use crate::icon::Icon;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

//===========================================================================//

/// Converts the 24-bit BMP file at `path` into a parsed [`Icon`].
///
/// The bitmap is decoded, encoded as a single-image ICO at a transient
/// `<path>.temp.ico` sibling, and that file is parsed back into an [`Icon`].
/// The transient file is removed before this function returns, on the
/// failure paths as well as on success; errors from any step propagate
/// unchanged.
pub fn icon_from_bmp<P: AsRef<Path>>(path: P) -> Result<Icon> {
    let path = path.as_ref();
    let bitmap = Bitmap::open(path)?;
    let temp_path = temp_ico_path(path);
    let result =
        bitmap.save_ico(&temp_path).and_then(|()| Icon::open(&temp_path));
    // One cleanup point for success and failure alike; if the encode failed
    // before the file was created there is nothing to remove, and that is
    // not an error.
    let _ = fs::remove_file(&temp_path);
    result
}

fn temp_ico_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".temp.ico");
    PathBuf::from(name)
}

//===========================================================================//


//===========================================================================//
