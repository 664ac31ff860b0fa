use std::fs;
use std::path::{Path, PathBuf};

use crate::adapter::DescriptionAdapter;
use crate::error::RestyleError;

pub const DESCRIPTION_FILE_NAME: &str = "image_restyle_description.txt";

pub fn default_description_path(root: &Path) -> PathBuf {
    root.join(DESCRIPTION_FILE_NAME)
}

/// Pure delegation to the external description source, no retries. Failures
/// are reported to the caller and leave the session retryable.
pub fn acquire(
    adapter: &dyn DescriptionAdapter,
    image_path: &Path,
) -> Result<String, RestyleError> {
    adapter.describe(image_path)
}

/// Overwrites the persisted description file with the current text. The file
/// holds one description at a time; there is no append mode.
pub fn save_description(path: &Path, text: &str) -> Result<(), RestyleError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockDescriptionAdapter;
    use tempfile::TempDir;

    #[test]
    fn acquire_delegates_to_the_adapter() {
        let temp = TempDir::new().expect("temp dir");
        let image = temp.path().join("photo.png");
        image::RgbImage::new(2, 2).save(&image).expect("save");

        let adapter = MockDescriptionAdapter::new("a cat on a sofa");
        let text = acquire(&adapter, &image).expect("acquire");
        assert_eq!(text, "a cat on a sofa");
    }

    #[test]
    fn save_overwrites_the_previous_description() {
        let temp = TempDir::new().expect("temp dir");
        let path = default_description_path(temp.path());

        save_description(&path, "first take").expect("save");
        save_description(&path, "second take").expect("save again");

        assert_eq!(fs::read_to_string(&path).expect("read"), "second take");
    }
}
