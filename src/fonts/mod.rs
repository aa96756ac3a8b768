//! Font loading utilities for the estimate renderer.
//!
//! The estimate is set in 맑은 고딕 (Malgun Gothic).  `genpdf` embeds TrueType files, so a font
//! that actually covers Hangul has to be found on disk.  The search order is:
//!
//! 1. `ESTIMATE_FONTS_DIR`
//! 2. `assets/fonts` next to the running executable
//! 3. `assets/fonts` in the crate manifest directory
//! 4. the Windows font directory (`ESTIMATE_WINDOWS_FONTS_DIR`, then `%WINDIR%\Fonts`)
//!
//! If Malgun Gothic is missing everywhere, NanumGothic from directories 1 to 3 is used instead.
//! Neither family ships italics, so the italic slots reuse the upright faces.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Display name of the preferred font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "맑은 고딕";

/// Environment variable that points at a directory with the font files.
pub const FONTS_DIR_ENV: &str = "ESTIMATE_FONTS_DIR";

/// Environment variable that overrides the Windows font directory.
pub const WINDOWS_FONTS_DIR_ENV: &str = "ESTIMATE_WINDOWS_FONTS_DIR";

/// Regular and bold file names of one font family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontFiles {
    /// Family name used in log and error messages.
    pub family: &'static str,
    /// File name of the regular face.
    pub regular: &'static str,
    /// File name of the bold face.
    pub bold: &'static str,
}

impl FontFiles {
    fn missing_in(&self, directory: &Path) -> Vec<&'static str> {
        [self.regular, self.bold]
            .into_iter()
            .filter(|name| !directory.join(name).is_file())
            .collect()
    }
}

/// Malgun Gothic as shipped with Windows.
pub const MALGUN_GOTHIC: FontFiles = FontFiles {
    family: "Malgun Gothic",
    regular: "malgun.ttf",
    bold: "malgunbd.ttf",
};

/// NanumGothic, used when Malgun Gothic is unavailable.
pub const NANUM_GOTHIC: FontFiles = FontFiles {
    family: "NanumGothic",
    regular: "NanumGothic.ttf",
    bold: "NanumGothicBold.ttf",
};

/// Returns the `assets/fonts` directory of this crate.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn bundled_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

/// Every directory searched for Malgun Gothic, in order.
fn malgun_candidates() -> Vec<PathBuf> {
    let mut candidates = bundled_directory_candidates();
    if let Some(windows) = windows_font_directory() {
        if !candidates.contains(&windows) {
            candidates.push(windows);
        }
    }
    candidates
}

/// A font family located on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFonts {
    /// The family that was found.
    pub files: FontFiles,
    /// Directory that holds both faces.
    pub directory: PathBuf,
}

fn describe_attempt(files: &FontFiles, directory: &Path) -> String {
    if !directory.is_dir() {
        return format!(
            "{} in {} (directory missing)",
            files.family,
            directory.display()
        );
    }
    format!(
        "{} in {} (missing files [{}])",
        files.family,
        directory.display(),
        files.missing_in(directory).join(", ")
    )
}

/// Locates a Korean font family without loading it.
///
/// Returns an error listing every location that was checked when no family is complete.
pub fn resolve_font_files() -> Result<ResolvedFonts, Error> {
    let mut attempts = Vec::new();

    let searches = [
        (MALGUN_GOTHIC, malgun_candidates()),
        (NANUM_GOTHIC, bundled_directory_candidates()),
    ];

    for (files, candidates) in searches {
        for directory in candidates {
            if directory.is_dir() && files.missing_in(&directory).is_empty() {
                if files != MALGUN_GOTHIC {
                    warn!(
                        "{} unavailable; falling back to {} from {}",
                        DEFAULT_FONT_FAMILY_NAME,
                        files.family,
                        directory.display()
                    );
                }
                return Ok(ResolvedFonts { files, directory });
            }
            attempts.push(describe_attempt(&files, &directory));
        }
    }

    Err(Error::new(
        format!(
            "Unable to locate a Korean font family. Checked: {}. Set {} to a directory containing {} and {}.",
            attempts.join(", "),
            FONTS_DIR_ENV,
            MALGUN_GOTHIC.regular,
            MALGUN_GOTHIC.bold
        ),
        io::Error::new(io::ErrorKind::NotFound, "korean fonts not found"),
    ))
}

fn load_face(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load {} font at {}: {}", style, path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

/// Loads the resolved family as a `genpdf` font family definition.
pub fn load_font_family(resolved: &ResolvedFonts) -> Result<FontFamily<FontData>, Error> {
    debug!(
        "Loading {} from {}",
        resolved.files.family,
        resolved.directory.display()
    );
    let directory = &resolved.directory;
    let files = &resolved.files;

    Ok(FontFamily {
        regular: load_face(directory, files.regular, "regular")?,
        bold: load_face(directory, files.bold, "bold")?,
        italic: load_face(directory, files.regular, "italic")?,
        bold_italic: load_face(directory, files.bold, "bold italic")?,
    })
}

/// Resolves and loads the Korean font family used for the estimate.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    let resolved = resolve_font_files()?;
    load_font_family(&resolved)
}

/// Returns `true` when the error means no font files could be found at all.
pub fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Indicates whether a complete Korean font family can be found on disk.
pub fn default_fonts_available() -> bool {
    resolve_font_files().is_ok()
}
