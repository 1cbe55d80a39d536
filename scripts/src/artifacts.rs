//! Lookup of compiled contract artifacts
//!
//! Both Foundry (`out/<File>.sol/<Name>.json`, bytecode under `bytecode.object`)
//! and Hardhat (`artifacts/**/<Name>.json`, bytecode under `bytecode`) layouts
//! are supported.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use tracing::debug;

use crate::errors::ScriptError;

/// The marker solc leaves in bytecode for unlinked library addresses
const LIBRARY_PLACEHOLDER: &str = "__";

/// A directory of compiled artifacts
#[derive(Clone, Debug)]
pub struct Artifacts {
    /// The root of the artifacts directory
    root: PathBuf,
}

/// The deployable parts of a compiled contract
#[derive(Clone, Debug)]
pub struct Artifact {
    /// The contract name
    pub name: String,
    /// The file the artifact was read from
    pub path: PathBuf,
    /// The creation bytecode
    pub bytecode: Bytes,
}

/// The subset of an artifact file read by the scripts
#[derive(Deserialize)]
struct RawArtifact {
    /// The creation bytecode, in either layout
    bytecode: RawBytecode,
}

/// The creation bytecode of an artifact
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Foundry layout
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
    /// Hardhat layout
    Hex(String),
}

impl RawBytecode {
    /// The hex-encoded bytecode regardless of layout
    fn hex(&self) -> &str {
        match self {
            RawBytecode::Object { object } => object,
            RawBytecode::Hex(hex) => hex,
        }
    }
}

impl Artifacts {
    /// Create a lookup rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact of the contract with the given name
    pub fn load(&self, name: &str) -> Result<Artifact, ScriptError> {
        let file_name = format!("{name}.json");
        let mut matches = Vec::new();
        find_files(&self.root, &file_name, &mut matches)?;

        let path = match matches.len() {
            0 => {
                return Err(ScriptError::ArtifactParsing(format!(
                    "no artifact `{}` under {}",
                    file_name,
                    self.root.display()
                )))
            }
            1 => matches.remove(0),
            _ => {
                let paths: Vec<String> =
                    matches.iter().map(|p| p.display().to_string()).collect();
                return Err(ScriptError::ArtifactParsing(format!(
                    "ambiguous artifact `{}`: {}",
                    file_name,
                    paths.join(", ")
                )));
            }
        };

        debug!("loading artifact {}", path.display());
        let bytecode = parse_bytecode(&path)?;

        Ok(Artifact {
            name: name.to_string(),
            path,
            bytecode,
        })
    }
}

/// Parse the creation bytecode out of an artifact file
fn parse_bytecode(path: &Path) -> Result<Bytes, ScriptError> {
    let contents =
        fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    let raw: RawArtifact = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

    let code = raw.bytecode.hex();
    if code.contains(LIBRARY_PLACEHOLDER) {
        return Err(ScriptError::ArtifactParsing(format!(
            "{} contains unlinked library references",
            path.display()
        )));
    }

    let bytecode = hex::decode(code)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{} has no bytecode, is it abstract or an interface?",
            path.display()
        )));
    }

    Ok(bytecode.into())
}

/// Recursively collect files with the given name under `dir`
fn find_files(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", dir.display(), e)))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();
        if path.is_dir() {
            find_files(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            out.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::Artifacts;
    use crate::errors::ScriptError;

    fn write(dir: &TempDir, rel: &str, contents: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_foundry_layout() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "OptionsToken.sol/OptionsToken.json",
            r#"{ "abi": [], "bytecode": { "object": "0x6080604052", "linkReferences": {} } }"#,
        );

        let artifact = Artifacts::new(dir.path()).load("OptionsToken").unwrap();
        assert_eq!(artifact.name, "OptionsToken");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_hardhat_layout() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "contracts/oracles/ThenaOracle.sol/ThenaOracle.json",
            r#"{ "contractName": "ThenaOracle", "bytecode": "0x6001", "deployedBytecode": "0x" }"#,
        );
        write(
            &dir,
            "contracts/oracles/ThenaOracle.sol/ThenaOracle.dbg.json",
            r#"{ "buildInfo": "../../build-info/abc.json" }"#,
        );

        let artifact = Artifacts::new(dir.path()).load("ThenaOracle").unwrap();
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x01]);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let res = Artifacts::new(dir.path()).load("OptionsCompounder");
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_interface_without_bytecode() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "IOracle.sol/IOracle.json",
            r#"{ "bytecode": { "object": "0x" } }"#,
        );

        let res = Artifacts::new(dir.path()).load("IOracle");
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_unlinked_library() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "Lib.sol/Linked.json",
            r#"{ "bytecode": { "object": "0x6080__$1234567890abcdef1234567890abcdef12$__" } }"#,
        );

        let res = Artifacts::new(dir.path()).load("Linked");
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_ambiguous_artifact() {
        let dir = TempDir::new().unwrap();
        let artifact = r#"{ "bytecode": { "object": "0x6001" } }"#;
        write(&dir, "A.sol/Mock.json", artifact);
        write(&dir, "B.sol/Mock.json", artifact);

        let res = Artifacts::new(dir.path()).load("Mock");
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
    }
}
