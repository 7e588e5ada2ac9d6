//! Local artifact scanner - builds a selector registry from Foundry/Hardhat output

use std::fs;
use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use anyhow::Context;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::abi::AbiRegistry;

/// Artifacts above this size are skipped
const MAX_ARTIFACT_BYTES: u64 = 5 * 1024 * 1024;

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for ABI files
    pub fn scan(root: impl AsRef<Path>) -> AbiRegistry {
        let root = root.as_ref();
        let mut registry = AbiRegistry::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    registry.errors.push(err.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("json")
                || !Self::path_contains_any(path, &["out", "artifacts"])
            {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > MAX_ARTIFACT_BYTES => continue,
                Ok(_) => {}
                Err(err) => {
                    registry.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            }

            registry.scanned_files += 1;
            if let Err(err) = Self::load_abi_file(path, &mut registry) {
                registry.errors.push(format!("{}: {}", path.display(), err));
            }
        }

        debug!(
            root = %root.display(),
            files = registry.scanned_files,
            functions = registry.len(),
            "scanned local artifacts"
        );
        registry
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> AbiRegistry {
        let mut registry = AbiRegistry::new();
        for root in roots {
            registry.merge(Self::scan(root));
        }
        registry
    }

    fn load_abi_file(path: &Path, registry: &mut AbiRegistry) -> anyhow::Result<()> {
        if let Some(abi) = read_abi_file(path)? {
            registry.merge(AbiRegistry::from_json_abi(&abi));
        }
        Ok(())
    }

    fn is_ignored_dir(path: &Path) -> bool {
        const IGNORED: &[&str] = &[".git", "target", "node_modules", ".next", "dist", "build"];
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| IGNORED.contains(&name))
    }

    /// True if any directory on the path is named like a build output
    fn path_contains_any(path: &Path, names: &[&str]) -> bool {
        path.iter()
            .filter_map(|part| part.to_str())
            .any(|part| names.contains(&part))
    }
}

/// Read a JSON ABI: either a bare array or an artifact with an `abi` field.
/// `Ok(None)` for JSON that carries no ABI at all.
pub fn read_abi_file(path: &Path) -> anyhow::Result<Option<JsonAbi>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let abi = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut fields) => match fields.remove("abi") {
            Some(abi) => abi,
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    let abi = serde_json::from_value(abi)
        .with_context(|| format!("Invalid ABI in {}", path.display()))?;
    Ok(Some(abi))
}
