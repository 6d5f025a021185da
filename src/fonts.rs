//! TrueType font discovery and registration for chart text.

use anyhow::{anyhow, Context, Result};
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};

/// Family name every chart element draws with
pub const FAMILY: &str = "sans-serif";

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

fn first_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Locate a regular-weight font, preferring an explicit path
pub fn find_font(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => first_existing(REGULAR_CANDIDATES),
    }
}

fn load_static(path: &Path) -> Result<&'static [u8]> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font file: {}", path.display()))?;
    // Registered fonts must outlive every chart drawn in this process
    Ok(Box::leak(data.into_boxed_slice()))
}

fn register_style(path: &Path, style: FontStyle) -> Result<()> {
    let bytes = load_static(path)?;
    register_font(FAMILY, style, bytes)
        .map_err(|_| anyhow!("Not a usable TrueType font: {}", path.display()))
}

/// Register regular and bold faces under [`FAMILY`]; returns the regular font path
pub fn register(explicit: Option<&Path>) -> Result<PathBuf> {
    let regular = find_font(explicit).ok_or_else(|| {
        anyhow!("No TrueType font found in standard locations; pass one with --font <path>")
    })?;

    // An explicit font is used for both weights
    let bold = match explicit {
        Some(_) => regular.clone(),
        None => first_existing(BOLD_CANDIDATES).unwrap_or_else(|| regular.clone()),
    };
    register_style(&bold, FontStyle::Bold)?;
    register_style(&regular, FontStyle::Normal)?;

    log::debug!("Registered fonts: regular={} bold={}", regular.display(), bold.display());
    Ok(regular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_font_wins() {
        let p = Path::new("/tmp/some-font.ttf");
        assert_eq!(find_font(Some(p)), Some(p.to_path_buf()));
    }

    #[test]
    fn missing_explicit_font_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = register(Some(&dir.path().join("missing.ttf"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read font file"));
    }

    #[test]
    fn garbage_font_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a font").unwrap();
        file.flush().unwrap();
        let err = register(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Not a usable TrueType font"));
    }
}
