//! Compiled model artifact layout.
//!
//! A model compiled for DLR is a directory holding three sibling files that
//! share a name prefix: the compiled operator library, the parameters and
//! the graph description.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DlrError, Result};

/// Extensions a compiled module library may carry, without the dot.
const MODULE_EXTENSIONS: [&str; 3] = ["so", "dylib", "dll"];

/// The kinds of file a compiled model consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Compiled operator library.
    Module,
    /// Serialized parameters.
    Params,
    /// Graph description.
    Graph,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module file(.so/.dylib/.dll)"),
            Self::Params => write!(f, "params file(.params)"),
            Self::Graph => write!(f, "graph file(.json)"),
        }
    }
}

/// Paths of a validated set of model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    /// Directory holding the artifacts.
    pub dir: PathBuf,
    /// Shared name prefix.
    pub prefix: String,
    /// Compiled operator library.
    pub module: PathBuf,
    /// Parameters file.
    pub params: PathBuf,
    /// Graph description file.
    pub graph: PathBuf,
}

impl ModelArtifacts {
    /// Locate `<prefix>.<ext>` artifacts in `dir`.
    ///
    /// Checks the module, params and graph files in that order and reports
    /// the first one that is absent or not a regular file.
    pub fn locate(dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let dir = dir.as_ref();

        let module = module_candidates(dir, prefix)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| DlrError::ArtifactMissing {
                kind: ArtifactKind::Module,
                path: dir.join(format!("{}.{}", prefix, std::env::consts::DLL_EXTENSION)),
            })?;

        let params = require_file(dir.join(format!("{}.params", prefix)), ArtifactKind::Params)?;
        let graph = require_file(dir.join(format!("{}.json", prefix)), ArtifactKind::Graph)?;

        debug!(
            "Found artifacts for '{}': {}, {}, {}",
            prefix,
            module.display(),
            params.display(),
            graph.display()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            module,
            params,
            graph,
        })
    }
}

/// Module paths to try, host platform extension first.
fn module_candidates(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let host = std::env::consts::DLL_EXTENSION;
    std::iter::once(host)
        .chain(MODULE_EXTENSIONS.iter().copied().filter(|ext| *ext != host))
        .map(|ext| dir.join(format!("{}.{}", prefix, ext)))
        .collect()
}

fn require_file(path: PathBuf, kind: ArtifactKind) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(DlrError::ArtifactMissing { kind, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_artifacts(dir: &Path, prefix: &str, module_ext: &str) {
        fs::write(dir.join(format!("{}.{}", prefix, module_ext)), b"lib").unwrap();
        fs::write(dir.join(format!("{}.params", prefix)), b"params").unwrap();
        fs::write(dir.join(format!("{}.json", prefix)), b"{}").unwrap();
    }

    fn missing_kind(err: DlrError) -> ArtifactKind {
        match err {
            DlrError::ArtifactMissing { kind, .. } => kind,
            other => panic!("expected ArtifactMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_all_present() {
        let tmp = TempDir::new().unwrap();
        write_artifacts(tmp.path(), "resnet", std::env::consts::DLL_EXTENSION);

        let artifacts = ModelArtifacts::locate(tmp.path(), "resnet").unwrap();
        assert_eq!(artifacts.prefix, "resnet");
        assert_eq!(artifacts.params, tmp.path().join("resnet.params"));
        assert_eq!(artifacts.graph, tmp.path().join("resnet.json"));
        assert!(artifacts.module.starts_with(tmp.path()));
    }

    #[test]
    fn test_locate_accepts_foreign_module_extension() {
        let tmp = TempDir::new().unwrap();
        write_artifacts(tmp.path(), "model", "dylib");

        let artifacts = ModelArtifacts::locate(tmp.path(), "model").unwrap();
        assert_eq!(artifacts.module, tmp.path().join("model.dylib"));
    }

    #[test]
    fn test_locate_missing_module() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model.params"), b"params").unwrap();
        fs::write(tmp.path().join("model.json"), b"{}").unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(missing_kind(err), ArtifactKind::Module);
    }

    #[test]
    fn test_locate_missing_params() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model.so"), b"lib").unwrap();
        fs::write(tmp.path().join("model.json"), b"{}").unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Params);
    }

    #[test]
    fn test_locate_missing_graph() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model.so"), b"lib").unwrap();
        fs::write(tmp.path().join("model.params"), b"params").unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Graph);
    }

    #[test]
    fn test_locate_rejects_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model.so"), b"lib").unwrap();
        fs::create_dir(tmp.path().join("model.params")).unwrap();
        fs::write(tmp.path().join("model.json"), b"{}").unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Params);
    }

    #[test]
    fn test_locate_reports_first_missing() {
        let tmp = TempDir::new().unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Module);
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        let tmp = TempDir::new().unwrap();
        write_artifacts(tmp.path(), "model_v2", "so");

        assert!(ModelArtifacts::locate(tmp.path(), "model").is_err());
    }

    #[test]
    fn test_module_candidates_host_first() {
        let candidates = module_candidates(Path::new("/m"), "net");
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[0],
            PathBuf::from(format!("/m/net.{}", std::env::consts::DLL_EXTENSION))
        );
    }

    #[test]
    fn test_locate_rejects_module_directory() {
        let tmp = TempDir::new().unwrap();
        for ext in MODULE_EXTENSIONS {
            fs::create_dir(tmp.path().join(format!("model.{}", ext))).unwrap();
        }
        fs::write(tmp.path().join("model.params"), b"params").unwrap();
        fs::write(tmp.path().join("model.json"), b"{}").unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Module);
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_rejects_dangling_graph_link() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("model.so"), b"lib").unwrap();
        fs::write(tmp.path().join("model.params"), b"params").unwrap();
        std::os::unix::fs::symlink(
            tmp.path().join("gone.json"),
            tmp.path().join("model.json"),
        )
        .unwrap();

        let err = ModelArtifacts::locate(tmp.path(), "model").unwrap_err();
        assert_eq!(missing_kind(err), ArtifactKind::Graph);
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_follows_module_link() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        fs::create_dir(&build).unwrap();
        fs::write(build.join("compiled.so"), b"lib").unwrap();
        std::os::unix::fs::symlink(build.join("compiled.so"), tmp.path().join("model.so"))
            .unwrap();
        fs::write(tmp.path().join("model.params"), b"params").unwrap();
        fs::write(tmp.path().join("model.json"), b"{}").unwrap();

        let artifacts = ModelArtifacts::locate(tmp.path(), "model").unwrap();
        assert_eq!(artifacts.module, tmp.path().join("model.so"));
    }
}
