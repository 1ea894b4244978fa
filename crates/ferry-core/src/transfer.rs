//! Orchestrates content-network operations behind a service readiness check.

use crate::client::ContentClient;
use crate::error::{FerryError, Result};
use crate::paths::MANIFEST_FILE;
use crate::service::ServiceLauncher;
use crate::sink::Sink;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Backing service every content operation depends on.
pub const SERVICE: &str = "ipfs";

/// Upper bound on concurrent uploads in a directory batch.
const MAX_BATCH_WORKERS: usize = 4;

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// One row of a directory-batch manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub hash: String,
    pub file_name: String,
}

/// Ordered (hash, file name) record of a directory batch upload. Row order
/// matches the directory listing order at call time.
#[derive(Debug, Clone, Default)]
pub struct TransferManifest {
    pub entries: Vec<ManifestEntry>,
}

impl TransferManifest {
    /// Newline-joined hash column.
    pub fn hashes(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.hash.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the two-column record, replacing any previous manifest.
    fn write(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        for entry in &self.entries {
            writeln!(file, "{},{}", entry.hash, entry.file_name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Transfer<'a> {
    launcher: &'a dyn ServiceLauncher,
    client: &'a dyn ContentClient,
    work_dir: PathBuf,
}

impl<'a> Transfer<'a> {
    /// Orchestrator rooted at the current working directory.
    pub fn new(launcher: &'a dyn ServiceLauncher, client: &'a dyn ContentClient) -> Result<Self> {
        let work_dir = std::env::current_dir()?;
        Ok(Self {
            launcher,
            client,
            work_dir,
        })
    }

    /// Orchestrator rooted at an explicit directory.
    pub fn rooted(
        launcher: &'a dyn ServiceLauncher,
        client: &'a dyn ContentClient,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher,
            client,
            work_dir: work_dir.into(),
        }
    }

    /// Re-checked before every operation; no readiness state is cached.
    fn ensure_service(&self, sink: &dyn Sink) -> Result<()> {
        self.launcher.ensure_running(SERVICE, sink)?;
        sink.emit("ipfs is running");
        Ok(())
    }

    pub fn get(&self, hash: &str, dest: &Path, sink: &dyn Sink) -> Result<()> {
        self.ensure_service(sink)?;
        self.client.get(hash, dest, sink)
    }

    pub fn put(&self, path: &Path, gateway: bool, sink: &dyn Sink) -> Result<String> {
        self.ensure_service(sink)?;
        self.client.put(path, gateway, sink)
    }

    pub fn pin(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        self.ensure_service(sink)?;
        self.client.pin(hash, sink)
    }

    pub fn cat(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        self.ensure_service(sink)?;
        self.client.cat(hash, sink)
    }

    pub fn ls(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        self.ensure_service(sink)?;
        self.client.ls(hash, sink)
    }

    pub fn ls_pinned(&self, sink: &dyn Sink) -> Result<String> {
        self.ensure_service(sink)?;
        self.client.ls_pinned(sink)
    }

    /// Upload every entry of `dir` (non-recursive), write the hash manifest,
    /// and echo the hash list to stdout.
    ///
    /// Uploads run on a small worker pool. The first failure cancels the
    /// remaining queue, nothing is written, and the error for the earliest
    /// entry in listing order is returned — a failed batch leaves no
    /// partial manifest behind.
    pub fn put_directory(
        &self,
        dir: &str,
        gateway: bool,
        sink: &dyn Sink,
    ) -> Result<TransferManifest> {
        self.ensure_service(sink)?;

        let dir_path = self.work_dir.join(dir);
        let read_err = |e: std::io::Error| FerryError::DirRead {
            path: dir_path.display().to_string(),
            source: e,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir_path).map_err(read_err)? {
            names.push(entry.map_err(read_err)?.file_name().to_string_lossy().into_owned());
        }
        // Listing order: lexicographic, so manifest rows are deterministic.
        names.sort();

        let slots: Vec<OnceLock<Result<String>>> = names.iter().map(|_| OnceLock::new()).collect();
        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let client = self.client;

        let workers = names.len().min(MAX_BATCH_WORKERS);
        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if failed.load(Ordering::SeqCst) {
                        break;
                    }
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    if i >= names.len() {
                        break;
                    }
                    let path = dir_path.join(&names[i]);
                    let result = client.put(&path, gateway, sink);
                    if result.is_err() {
                        failed.store(true, Ordering::SeqCst);
                    }
                    let _ = slots[i].set(result);
                });
            }
        });

        let mut manifest = TransferManifest::default();
        for (name, slot) in names.iter().zip(slots) {
            match slot.into_inner() {
                Some(Ok(hash)) => manifest.entries.push(ManifestEntry {
                    hash,
                    file_name: name.clone(),
                }),
                Some(Err(e)) => return Err(e),
                // Skipped after a failure elsewhere in the batch.
                None => return Err(FerryError::Network("upload batch aborted".into())),
            }
        }

        manifest.write(&self.work_dir.join(MANIFEST_FILE))?;
        // The structured result does not always reach a terminal; the echo does.
        println!("{}", manifest.hashes());
        Ok(manifest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::DiscardSink;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct NullLauncher;

    impl ServiceLauncher for NullLauncher {
        fn ensure_running(&self, _name: &str, _sink: &dyn Sink) -> Result<()> {
            Ok(())
        }
    }

    struct DownLauncher;

    impl ServiceLauncher for DownLauncher {
        fn ensure_running(&self, name: &str, _sink: &dyn Sink) -> Result<()> {
            Err(FerryError::ServiceUnavailable {
                service: name.to_string(),
                reason: "down".to_string(),
            })
        }
    }

    struct CountingLauncher {
        calls: AtomicU32,
    }

    impl ServiceLauncher for CountingLauncher {
        fn ensure_running(&self, _name: &str, _sink: &dyn Sink) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Hashes file names deterministically; fails on names in `fail_on`.
    struct ScriptedClient {
        fail_on: Vec<String>,
        uploads: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(fail_on: &[&str]) -> Self {
            Self {
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
                uploads: Mutex::new(Vec::new()),
            }
        }
    }

    impl ContentClient for ScriptedClient {
        fn get(&self, _hash: &str, _dest: &Path, _sink: &dyn Sink) -> Result<()> {
            panic!("get not scripted");
        }

        fn put(&self, path: &Path, _gateway: bool, _sink: &dyn Sink) -> Result<String> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.uploads.lock().unwrap().push(name.clone());
            if self.fail_on.contains(&name) {
                return Err(FerryError::Network(format!("refused {name}")));
            }
            Ok(format!("Qm-{name}"))
        }

        fn pin(&self, _hash: &str, _sink: &dyn Sink) -> Result<String> {
            panic!("pin not scripted");
        }

        fn cat(&self, _hash: &str, _sink: &dyn Sink) -> Result<String> {
            panic!("cat not scripted");
        }

        fn ls(&self, _hash: &str, _sink: &dyn Sink) -> Result<String> {
            panic!("ls not scripted");
        }

        fn ls_pinned(&self, _sink: &dyn Sink) -> Result<String> {
            panic!("ls_pinned not scripted");
        }
    }

    fn seed_dir(work: &TempDir, dir: &str, files: &[&str]) {
        let path = work.path().join(dir);
        std::fs::create_dir_all(&path).unwrap();
        for f in files {
            std::fs::write(path.join(f), format!("content of {f}")).unwrap();
        }
    }

    #[test]
    fn batch_success_writes_ordered_manifest() {
        let work = TempDir::new().unwrap();
        seed_dir(&work, "artifacts", &["b.txt", "a.txt", "c.txt"]);

        let client = ScriptedClient::new(&[]);
        let transfer = Transfer::rooted(&NullLauncher, &client, work.path());
        let manifest = transfer
            .put_directory("artifacts", false, &DiscardSink)
            .unwrap();

        let names: Vec<&str> = manifest.entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(manifest.entries.iter().all(|e| !e.hash.is_empty()));

        let written = std::fs::read_to_string(work.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(written, "Qm-a.txt,a.txt\nQm-b.txt,b.txt\nQm-c.txt,c.txt\n");
    }

    #[test]
    fn batch_failure_writes_no_manifest() {
        let work = TempDir::new().unwrap();
        seed_dir(&work, "artifacts", &["a.txt", "b.txt", "c.txt"]);

        let client = ScriptedClient::new(&["b.txt"]);
        let transfer = Transfer::rooted(&NullLauncher, &client, work.path());
        let err = transfer
            .put_directory("artifacts", false, &DiscardSink)
            .unwrap_err();

        assert!(matches!(err, FerryError::Network(_)));
        assert!(!work.path().join(MANIFEST_FILE).exists());
    }

    #[test]
    fn batch_failure_leaves_prior_manifest_untouched() {
        let work = TempDir::new().unwrap();
        seed_dir(&work, "artifacts", &["a.txt"]);
        std::fs::write(work.path().join(MANIFEST_FILE), "Qm-old,old.txt\n").unwrap();

        let client = ScriptedClient::new(&["a.txt"]);
        let transfer = Transfer::rooted(&NullLauncher, &client, work.path());
        transfer
            .put_directory("artifacts", false, &DiscardSink)
            .unwrap_err();

        let content = std::fs::read_to_string(work.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(content, "Qm-old,old.txt\n");
    }

    #[test]
    fn batch_returns_error_for_earliest_failed_entry() {
        let work = TempDir::new().unwrap();
        seed_dir(&work, "artifacts", &["a.txt", "b.txt"]);

        let client = ScriptedClient::new(&["a.txt"]);
        let transfer = Transfer::rooted(&NullLauncher, &client, work.path());
        let err = transfer
            .put_directory("artifacts", false, &DiscardSink)
            .unwrap_err();

        assert!(err.to_string().contains("a.txt"), "got: {err}");
    }

    #[test]
    fn batch_on_missing_directory_is_a_read_error() {
        let work = TempDir::new().unwrap();
        let client = ScriptedClient::new(&[]);
        let transfer = Transfer::rooted(&NullLauncher, &client, work.path());
        let err = transfer
            .put_directory("nope", false, &DiscardSink)
            .unwrap_err();
        assert!(matches!(err, FerryError::DirRead { .. }));
    }

    #[test]
    fn unavailable_service_blocks_every_operation() {
        let work = TempDir::new().unwrap();
        let client = ScriptedClient::new(&[]);
        let transfer = Transfer::rooted(&DownLauncher, &client, work.path());

        let err = transfer.cat("QmAbc", &DiscardSink).unwrap_err();
        assert!(matches!(err, FerryError::ServiceUnavailable { .. }));
        // The network client was never reached.
        assert!(client.uploads.lock().unwrap().is_empty());
    }

    #[test]
    fn readiness_is_rechecked_on_every_call() {
        let work = TempDir::new().unwrap();
        seed_dir(&work, "artifacts", &["a.txt"]);
        let launcher = CountingLauncher {
            calls: AtomicU32::new(0),
        };
        let client = ScriptedClient::new(&[]);
        let transfer = Transfer::rooted(&launcher, &client, work.path());

        transfer.put(&work.path().join("artifacts/a.txt"), false, &DiscardSink).unwrap();
        transfer.put_directory("artifacts", false, &DiscardSink).unwrap();
        assert_eq!(launcher.calls.load(Ordering::SeqCst), 2);
    }
}
