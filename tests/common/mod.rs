// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed Composer project and a fluent
// builder so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde_json::{Value, json};

use composer_symlinks::cli::GlobalOpts;
use composer_symlinks::commands::Host;
use composer_symlinks::config::environment::MapEnvironment;
use composer_symlinks::exec::{ExecResult, Executor};
use composer_symlinks::logging::{BufferedLog, LogLevel};
use composer_symlinks::resources::registry::{REGISTRY_FILENAME, RegistryMap, SymlinksRegistry};

/// [`Executor`] for a machine without PHP.
#[derive(Debug)]
pub struct NoPhp;

impl Executor for NoPhp {
    fn run(&self, program: &str, _args: &[&str]) -> Result<ExecResult> {
        bail!("{program} is not available in tests")
    }

    fn which(&self, _program: &str) -> bool {
        false
    }
}

/// An isolated Composer project backed by a [`tempfile::TempDir`].
pub struct TestProject {
    /// Temporary directory holding the project.
    pub dir: tempfile::TempDir,
    /// Canonical project root.
    pub root: PathBuf,
    /// Environment seen by the commands.
    pub env: MapEnvironment,
}

impl TestProject {
    /// Path inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Absolute path string of a project-relative path, as the registry
    /// records it.
    pub fn key(&self, rel: &str) -> String {
        self.path(rel).to_string_lossy().into_owned()
    }

    /// Global CLI options pointing at this project.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            project_dir: Some(self.root.clone()),
            php_version: Some("8.2.0".to_string()),
        }
    }

    /// Run `f` with a [`Host`] whose output is captured in the returned log.
    pub fn with_host<T>(&self, f: impl FnOnce(&Host<'_>) -> T) -> (T, BufferedLog) {
        let log = BufferedLog::new();
        let host = Host {
            env: &self.env,
            executor: &NoPhp,
            log: &log,
        };
        let out = f(&host);
        (out, log)
    }

    /// Overwrite the plugin section of `composer.json`.
    pub fn set_config(&self, section: &Value) {
        write_manifest(&self.root, section);
    }

    /// Registry file path.
    pub fn registry_file(&self) -> PathBuf {
        self.path("vendor").join(REGISTRY_FILENAME)
    }

    /// Registry contents.
    pub fn registry(&self) -> RegistryMap {
        SymlinksRegistry::new(&self.path("vendor")).load()
    }

    /// Link target as stored on disk.
    pub fn read_link(&self, rel: &str) -> PathBuf {
        std::fs::read_link(self.path(rel)).expect("read link")
    }
}

fn write_manifest(root: &Path, section: &Value) {
    let manifest = json!({
        "name": "acme/app",
        "extra": {"somework/composer-symlinks": section}
    });
    std::fs::write(
        root.join("composer.json"),
        serde_json::to_string_pretty(&manifest).expect("encode manifest"),
    )
    .expect("write composer.json");
}

/// Fluent builder for [`TestProject`].
pub struct TestProjectBuilder {
    project: TestProject,
    section: Value,
}

impl TestProjectBuilder {
    /// Begin building an empty project.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        Self {
            project: TestProject {
                dir,
                root,
                env: MapEnvironment::new(),
            },
            section: json!({}),
        }
    }

    /// Create a file with some content at a project-relative path.
    pub fn with_file(self, rel: &str) -> Self {
        let path = self.project.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create file parent");
        }
        std::fs::write(&path, rel).expect("write file");
        self
    }

    /// Create a directory at a project-relative path.
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.project.root.join(rel)).expect("create dir");
        self
    }

    /// Use `section` as `extra."somework/composer-symlinks"`.
    pub fn with_config(mut self, section: Value) -> Self {
        self.section = section;
        self
    }

    /// Set an environment variable seen by the commands.
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.project.env = self.project.env.with(name, value);
        self
    }

    /// Write `composer.json` and return the project.
    pub fn build(self) -> TestProject {
        write_manifest(&self.project.root, &self.section);
        self.project
    }
}

/// Messages logged at `level`, joined by newlines.
pub fn lines(log: &BufferedLog, level: LogLevel) -> String {
    log.messages(level).join("\n")
}
