//! API version detection from the artifact that provides a marker type.

use crate::error::EnvironmentError;
use jsm_api::ApiVersion;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const MANIFEST: &str = "META-INF/MANIFEST.MF";
const VERSION_ATTRIBUTES: &[&str] = &["Implementation-Version", "Bundle-Version", "Specification-Version"];

/// Version of the artifact at `path`: manifest attributes first, then a
/// `-<version>` suffix of the archive file name.
pub fn artifact_version(path: &Path) -> Result<Option<ApiVersion>, EnvironmentError> {
    let manifest = if path.is_dir() {
        let file = path.join(MANIFEST);
        if file.is_file() {
            Some(std::fs::read_to_string(&file).map_err(|source| EnvironmentError::io(&file, source))?)
        } else {
            None
        }
    } else {
        read_archive_manifest(path)?
    };

    if let Some(version) = manifest.as_deref().and_then(manifest_version) {
        return Ok(Some(version));
    }
    Ok(file_name_version(path))
}

fn read_archive_manifest(path: &Path) -> Result<Option<String>, EnvironmentError> {
    let file = File::open(path).map_err(|source| EnvironmentError::io(path, source))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|source| EnvironmentError::archive(path, source))?;
    let mut entry = match archive.by_name(MANIFEST) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(source) => return Err(EnvironmentError::archive(path, source)),
    };
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|source| EnvironmentError::io(path, source))?;
    Ok(Some(text))
}

pub(crate) fn manifest_version(manifest: &str) -> Option<ApiVersion> {
    let attributes = manifest_attributes(manifest);
    VERSION_ATTRIBUTES.iter().find_map(|name| {
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| ApiVersion::parse(value))
    })
}

/// Main-section attributes, joining continuation lines.
fn manifest_attributes(manifest: &str) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    for line in manifest.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        if let Some(continued) = line.strip_prefix(' ') {
            if let Some((_, value)) = attributes.last_mut() {
                value.push_str(continued);
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            attributes.push((key.trim().to_string(), value.trim().to_string()));
        }
    }
    attributes
}

pub(crate) fn file_name_version(path: &Path) -> Option<ApiVersion> {
    let stem = path.file_stem().and_then(OsStr::to_str)?;
    stem.match_indices('-')
        .map(|(index, _)| &stem[index + 1..])
        .find(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .and_then(ApiVersion::parse)
}
