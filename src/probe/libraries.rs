//! Required ROCm library resolution.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{ConfigResult, ConfigurationError};
use crate::util::host::Host;

/// Libraries every ROCm build links against.
pub const REQUIRED_LIBRARIES: &[&str] = &[
    "amdhip64",
    "rocblas",
    "rocfft",
    "hiprand",
    "MIOpen",
    "rccl",
    "hipsparse",
    "roctracer64",
    "rocsolver",
];

/// Library whose soname version tracks the ROCm major version.
const HIP_RUNTIME_LIBRARY: &str = "amdhip64";

/// A library to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    pub name: String,
    /// Soname version, when known (`libamdhip64.so.6`).
    pub version: Option<String>,
}

impl LibraryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        LibraryRequest {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Unversioned file name, e.g. `librocblas.so`.
    pub fn file_name(&self) -> String {
        format!("lib{}.so", self.name)
    }
}

/// A library located on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLibrary {
    /// Base name of the candidate that matched (before symlink resolution).
    pub file_name: String,
    /// Canonical path with symlinks resolved.
    pub path: PathBuf,
}

/// The required library list for a ROCm version.
///
/// `rocm_version_number` is the helper's encoded version (`60200` for
/// 6.2.0); when it parses, the HIP runtime is also searched under its
/// versioned soname.
pub fn required_libraries(rocm_version_number: &str) -> Vec<LibraryRequest> {
    let major = rocm_version_number
        .trim()
        .parse::<u64>()
        .ok()
        .map(|n| n / 10_000)
        .filter(|major| *major > 0);

    REQUIRED_LIBRARIES
        .iter()
        .map(|name| {
            let request = LibraryRequest::new(*name);
            match major {
                Some(major) if *name == HIP_RUNTIME_LIBRARY => {
                    request.with_version(major.to_string())
                }
                _ => request,
            }
        })
        .collect()
}

/// Candidate paths for one library, most specific first.
pub fn candidate_paths(base: &Path, request: &LibraryRequest, arch: &str) -> Vec<PathBuf> {
    let file = request.file_name();
    let mut candidates = Vec::with_capacity(6);

    if let Some(ref version) = request.version {
        candidates.push(base.join("lib64").join(format!("{}.{}", file, version)));
    }
    candidates.push(base.join("lib64").join(&file));
    candidates.push(base.join("lib64").join("stubs").join(&file));
    candidates.push(base.join("lib").join(format!("{}-linux-gnu", arch)).join(&file));
    candidates.push(base.join("lib").join(&file));
    candidates.push(base.join(&file));

    candidates
}

/// First candidate for which `exists` holds.
pub fn resolve_first_existing<F>(candidates: &[PathBuf], exists: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    candidates.iter().find(|p| exists(p)).cloned()
}

/// Resolve every requested library under `base`.
///
/// All candidates are checked in a single [`Host::exists_all`] call. A
/// library with no existing candidate fails the whole resolution.
pub fn resolve_libraries(
    host: &dyn Host,
    base: &Path,
    requests: &[LibraryRequest],
    arch: &str,
) -> ConfigResult<BTreeMap<String, ResolvedLibrary>> {
    let per_library: Vec<Vec<PathBuf>> = requests
        .iter()
        .map(|r| candidate_paths(base, r, arch))
        .collect();

    let all: Vec<PathBuf> = per_library.iter().flatten().cloned().collect();
    let existing: HashSet<&Path> = all
        .iter()
        .zip(host.exists_all(&all))
        .filter(|(_, exists)| *exists)
        .map(|(path, _)| path.as_path())
        .collect();

    let mut resolved = BTreeMap::new();
    for (request, candidates) in requests.iter().zip(per_library) {
        let Some(found) = resolve_first_existing(&candidates, |p| existing.contains(p)) else {
            return Err(ConfigurationError::MissingLibrary {
                name: request.name.clone(),
                searched: candidates,
            });
        };

        let path = host
            .realpath(&found)
            .map_err(|e| ConfigurationError::Realpath {
                path: found.clone(),
                message: format!("{:#}", e),
            })?;
        let file_name = found
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.file_name());

        tracing::debug!("{} -> {}", request.name, path.display());
        resolved.insert(request.name.clone(), ResolvedLibrary { file_name, path });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockHost;

    #[test]
    fn test_resolve_first_existing_in_order() {
        let candidates = vec![
            PathBuf::from("/a/lib64/libx.so"),
            PathBuf::from("/a/lib/libx.so"),
        ];

        let found = resolve_first_existing(&candidates, |p| p == Path::new("/a/lib/libx.so"));
        assert_eq!(found, Some(PathBuf::from("/a/lib/libx.so")));

        let found = resolve_first_existing(&candidates, |_| true);
        assert_eq!(found, Some(PathBuf::from("/a/lib64/libx.so")));

        assert_eq!(resolve_first_existing(&candidates, |_| false), None);
    }

    #[test]
    fn test_candidate_order() {
        let request = LibraryRequest::new("amdhip64").with_version("6");
        let candidates = candidate_paths(Path::new("/opt/rocm"), &request, "x86_64");

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/rocm/lib64/libamdhip64.so.6"),
                PathBuf::from("/opt/rocm/lib64/libamdhip64.so"),
                PathBuf::from("/opt/rocm/lib64/stubs/libamdhip64.so"),
                PathBuf::from("/opt/rocm/lib/x86_64-linux-gnu/libamdhip64.so"),
                PathBuf::from("/opt/rocm/lib/libamdhip64.so"),
                PathBuf::from("/opt/rocm/libamdhip64.so"),
            ]
        );
    }

    #[test]
    fn test_required_libraries_version_hip_runtime() {
        let libs = required_libraries("60200");
        assert_eq!(libs.len(), REQUIRED_LIBRARIES.len());
        assert_eq!(libs[0], LibraryRequest::new("amdhip64").with_version("6"));
        assert!(libs[1..].iter().all(|l| l.version.is_none()));

        assert!(required_libraries("unknown").iter().all(|l| l.version.is_none()));
    }

    #[test]
    fn test_resolve_libraries_single_batch() {
        let host = MockHost::new()
            .with_file("/opt/rocm/lib64/librocblas.so")
            .with_file("/opt/rocm/lib/librocblas.so")
            .with_symlink("/opt/rocm/lib/libMIOpen.so", "/opt/rocm/lib/libMIOpen.so.1.0.60200");
        let requests = vec![LibraryRequest::new("rocblas"), LibraryRequest::new("MIOpen")];

        let resolved =
            resolve_libraries(&host, Path::new("/opt/rocm"), &requests, "x86_64").unwrap();

        assert_eq!(
            resolved["rocblas"],
            ResolvedLibrary {
                file_name: "librocblas.so".to_string(),
                path: PathBuf::from("/opt/rocm/lib64/librocblas.so"),
            }
        );
        assert_eq!(
            resolved["MIOpen"],
            ResolvedLibrary {
                file_name: "libMIOpen.so".to_string(),
                path: PathBuf::from("/opt/rocm/lib/libMIOpen.so.1.0.60200"),
            }
        );
        assert_eq!(host.exists_batches(), 1);
    }

    #[test]
    fn test_resolve_prefers_versioned_soname() {
        let host = MockHost::new()
            .with_file("/opt/rocm/lib64/libamdhip64.so.6")
            .with_file("/opt/rocm/lib64/libamdhip64.so");
        let requests = vec![LibraryRequest::new("amdhip64").with_version("6")];

        let resolved =
            resolve_libraries(&host, Path::new("/opt/rocm"), &requests, "x86_64").unwrap();
        assert_eq!(resolved["amdhip64"].file_name, "libamdhip64.so.6");
    }

    #[test]
    fn test_missing_library_fails() {
        let host = MockHost::new().with_file("/opt/rocm/lib/librocblas.so");
        let requests = vec![LibraryRequest::new("rocblas"), LibraryRequest::new("rccl")];

        let err =
            resolve_libraries(&host, Path::new("/opt/rocm"), &requests, "x86_64").unwrap_err();
        match err {
            ConfigurationError::MissingLibrary { name, searched } => {
                assert_eq!(name, "rccl");
                assert_eq!(searched.len(), 5);
                assert_eq!(searched[0], PathBuf::from("/opt/rocm/lib64/librccl.so"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
