//! Source package loading from archives and directories

use crate::error::PackageError;
use crate::models::Extension;
use crate::parser::parse_config;
use crate::utils::decode_text;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Load a source package from a zip archive or an unpacked directory.
pub fn load_extension(input: &Path) -> Result<Extension, PackageError> {
    if input.is_dir() {
        load_from_directory(input)
    } else {
        load_from_archive(input)
    }
}

/// Load an unpacked extension directory. The config.xml check doubles as a
/// sanity check that this is a widget package at all.
pub fn load_from_directory(dir: &Path) -> Result<Extension, PackageError> {
    let config_path = dir.join("config.xml");
    if !config_path.exists() {
        return Err(PackageError::InvalidPackage(format!(
            "did not find config.xml in the input directory {}. Is this an Opera extension?",
            dir.display()
        )));
    }
    let config = parse_config(&decode_text(&fs::read(&config_path)?))?;

    let mut files = HashMap::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            let path = entry.path();
            let relative = path
                .strip_prefix(dir)
                .map_err(|_| PackageError::MissingFile(path.to_path_buf()))?;
            files.insert(relative.to_path_buf(), fs::read(path)?);
        }
    }

    Ok(Extension::new(config, files))
}

/// Load a packed .oex (zip) archive.
pub fn load_from_archive(archive_path: &Path) -> Result<Extension, PackageError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut files = HashMap::new();
    let mut config_bytes: Option<Vec<u8>> = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let Some(path) = sanitized_member_path(entry.name()) else {
            continue;
        };
        let mut content = Vec::with_capacity(entry.size() as usize);
        std::io::copy(&mut entry, &mut content)?;

        if path == Path::new("config.xml") {
            config_bytes = Some(content.clone());
        }
        files.insert(path, content);
    }

    let config_bytes = config_bytes.ok_or_else(|| {
        PackageError::InvalidPackage(
            "is the input file a valid Opera extension? We did not find a config.xml inside"
                .to_string(),
        )
    })?;
    let config = parse_config(&decode_text(&config_bytes))?;

    Ok(Extension::new(config, files))
}

/// Reject absolute and parent-escaping member names instead of extracting
/// them somewhere unexpected.
fn sanitized_member_path(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Some(path)
    } else {
        None
    }
}
