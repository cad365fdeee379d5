use std::{
    fs,
    path::{Path, PathBuf},
};

const LIBRARY_ARTIFACT_FILE: &str = "realtime-client.bin";

/// One tier of the client-library acquisition chain: fetch the artifact
/// into the cache, or fail the tier.
pub trait LibrarySource: Send + Sync {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<(), LibraryFetchError>;
}

pub fn artifact_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(LIBRARY_ARTIFACT_FILE)
}

/// Primary tier: download from the configured remote URL.
#[derive(Debug, Clone)]
pub struct RemoteLibrarySource {
    url: String,
    target: PathBuf,
}

impl RemoteLibrarySource {
    pub fn new(url: impl Into<String>, target: PathBuf) -> Self {
        Self {
            url: url.into(),
            target,
        }
    }
}

impl LibrarySource for RemoteLibrarySource {
    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }

    fn fetch(&self) -> Result<(), LibraryFetchError> {
        let response = reqwest::blocking::get(&self.url)
            .map_err(|source| LibraryFetchError::Request(source.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibraryFetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|source| LibraryFetchError::Request(source.to_string()))?;

        fs::write(&self.target, &body).map_err(|source| LibraryFetchError::Write {
            path: self.target.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Fallback tier: copy a locally shipped artifact.
#[derive(Debug, Clone)]
pub struct LocalLibrarySource {
    path: PathBuf,
    target: PathBuf,
}

impl LocalLibrarySource {
    pub fn new(path: PathBuf, target: PathBuf) -> Self {
        Self { path, target }
    }
}

impl LibrarySource for LocalLibrarySource {
    fn describe(&self) -> String {
        format!("local {}", self.path.display())
    }

    fn fetch(&self) -> Result<(), LibraryFetchError> {
        if !self.path.exists() {
            return Err(LibraryFetchError::Missing {
                path: self.path.clone(),
            });
        }

        if self.path != self.target {
            fs::copy(&self.path, &self.target).map_err(|source| LibraryFetchError::Write {
                path: self.target.clone(),
                source,
            })?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum LibraryFetchError {
    Request(String),
    Status(u16),
    Missing { path: PathBuf },
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for LibraryFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(details) => write!(f, "request failed: {details}"),
            Self::Status(status) => write!(f, "unexpected response status {status}"),
            Self::Missing { path } => write!(f, "artifact not found at {}", path.display()),
            Self::Write { path, source } => {
                write!(f, "failed to write artifact to {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LibraryFetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_source_copies_the_artifact_into_the_cache() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let origin = dir.path().join("shipped.bin");
        fs::write(&origin, b"client").expect("origin artifact should be written");
        let target = artifact_path(dir.path());

        let source = LocalLibrarySource::new(origin, target.clone());
        source.fetch().expect("local fetch should succeed");

        assert_eq!(fs::read(target).expect("artifact should exist"), b"client");
    }

    #[test]
    fn local_source_fails_when_the_artifact_is_missing() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let source = LocalLibrarySource::new(
            dir.path().join("absent.bin"),
            artifact_path(dir.path()),
        );

        let error = source.fetch().expect_err("missing artifact must fail");

        assert!(matches!(error, LibraryFetchError::Missing { .. }));
    }

    #[test]
    fn local_source_with_target_equal_to_origin_is_a_noop() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let origin = artifact_path(dir.path());
        fs::write(&origin, b"client").expect("artifact should be written");

        let source = LocalLibrarySource::new(origin.clone(), origin.clone());
        source.fetch().expect("same-path fetch should succeed");

        assert_eq!(fs::read(origin).expect("artifact should exist"), b"client");
    }

    #[test]
    fn sources_describe_their_tier() {
        let remote = RemoteLibrarySource::new("https://cdn.example/client", PathBuf::new());
        let local = LocalLibrarySource::new(PathBuf::from("/opt/client.bin"), PathBuf::new());

        assert_eq!(remote.describe(), "remote https://cdn.example/client");
        assert_eq!(local.describe(), "local /opt/client.bin");
    }
}
