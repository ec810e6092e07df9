use super::Credential;
use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Persistent key-value slot holding at most one credential.
pub trait CredentialStore: Send {
    fn get(&self) -> Result<Option<Credential>>;
    fn set(&mut self, credential: &Credential) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Read-only, process-wide credential source.
pub trait EnvironmentSource: Send {
    fn get(&self) -> Option<Credential>;
}

/// Stores the key as a single file under the workspace root.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default workspace location (see [`crate::config::credential_file_path`]).
    pub fn for_workspace() -> Result<Self> {
        Ok(Self::new(crate::config::credential_file_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Credential::new(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read credential file {:?}", self.path)),
        }
    }

    fn set(&mut self, credential: &Credential) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create credential directory {:?}", dir))?;
        }
        write_private(&self.path, credential.expose().as_bytes())
            .with_context(|| format!("Failed to write credential file {:?}", self.path))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove credential file {:?}", self.path)),
        }
    }
}

/// Writes `data` readable by the owner only. Existing files are narrowed too.
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(data)
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(data)
    }
}

/// In-process store for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    value: Option<Credential>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>> {
        Ok(self.value.clone())
    }

    fn set(&mut self, credential: &Credential) -> Result<()> {
        self.value = Some(credential.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.value = None;
        Ok(())
    }
}

/// Reads the key from a named environment variable on every lookup.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    var: String,
}

impl ProcessEnvironment {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl EnvironmentSource for ProcessEnvironment {
    fn get(&self) -> Option<Credential> {
        env::var(&self.var).ok().and_then(Credential::new)
    }
}

/// Fixed environment value, captured once.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    value: Option<Credential>,
}

impl StaticEnvironment {
    pub fn new(value: Option<&str>) -> Self {
        Self {
            value: value.and_then(Credential::new),
        }
    }
}

impl EnvironmentSource for StaticEnvironment {
    fn get(&self) -> Option<Credential> {
        self.value.clone()
    }
}
