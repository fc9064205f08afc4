//! Output package builder
//!
//! Assembles the converted file set (source files, rewritten files, shims,
//! generated manifest) and writes it as a .nex zip or an unpacked directory.
//! Signing is out of scope; the output is an unsigned package.

use crate::error::PackageError;
use crate::models::ConversionResult;
use crate::utils::delocalized_path;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// The final output file map, zip-member names to contents.
pub fn assemble_output(result: &ConversionResult) -> BTreeMap<String, Vec<u8>> {
    let mut output: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let keep_locales = result.manifest.default_locale.is_some();

    for (path, content) in &result.source.files {
        let name = member_name(path);
        if name == "config.xml" {
            continue;
        }
        // _locales is only meaningful when the manifest declares a locale
        if !keep_locales && name.starts_with("_locales/") {
            continue;
        }
        output.insert(name, content.clone());
    }

    for modified in &result.modified_files {
        output.insert(
            member_name(&modified.path),
            modified.new_content.clone().into_bytes(),
        );
    }

    for new_file in &result.new_files {
        output.insert(member_name(&new_file.path), new_file.content.clone().into_bytes());
    }

    if let Ok(manifest_json) = result.manifest.to_json() {
        output.insert("manifest.json".to_string(), manifest_json.into_bytes());
    }

    // English locale resources shadow the package root when nothing else
    // provides the file there.
    let copy_down: Vec<(String, Vec<u8>)> = output
        .iter()
        .filter_map(|(name, content)| {
            delocalized_path(name)
                .filter(|target| !output.contains_key(target))
                .map(|target| (target, content.clone()))
        })
        .collect();
    output.extend(copy_down);

    output
}

/// Write the converted package. `unpacked` produces a directory tree for
/// development, otherwise a .nex zip is written at `output_path`.
pub fn build_package(
    result: &ConversionResult,
    output_path: &Path,
    unpacked: bool,
) -> Result<(), PackageError> {
    let output = assemble_output(result);
    if unpacked {
        write_directory(&output, output_path)
    } else {
        write_archive(&output, output_path)
    }
}

fn write_directory(output: &BTreeMap<String, Vec<u8>>, dir: &Path) -> Result<(), PackageError> {
    fs::create_dir_all(dir)?;
    for (name, content) in output {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn write_archive(output: &BTreeMap<String, Vec<u8>>, archive_path: &Path) -> Result<(), PackageError> {
    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in output {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

fn member_name(path: &PathBuf) -> String {
    path.to_string_lossy().replace('\\', "/")
}
