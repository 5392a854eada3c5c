#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tlg_convert::{ConversionService, ProcessConverter, TempArtifactNamer};

pub const SAMPLE_CSV: &str = "date,symbol,qty\n2024-01-01,ABC,10\n";

/// Scratch space for one test: `artifacts/` is the service temp dir, stub
/// scripts and markers live next to it so they never count as leftovers.
pub struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("artifacts")).unwrap();
        Self { root }
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.path().join("artifacts")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Writes a shell script and returns a converter that runs it with
    /// `/bin/sh`, so the script itself never needs the exec bit.
    pub fn stub(&self, body: &str, timeout: Duration) -> ProcessConverter {
        let script = self.path(&format!("converter_{}.sh", next_script_id()));
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        ProcessConverter::new(
            "/bin/sh",
            vec![script.to_string_lossy().into_owned()],
            timeout,
        )
    }

    pub fn service(&self, converter: ProcessConverter) -> ConversionService {
        ConversionService::new(
            TempArtifactNamer::new(self.artifacts_dir()),
            Arc::new(converter),
        )
    }

    pub fn service_with_stub(&self, body: &str) -> ConversionService {
        self.service(self.stub(body, Duration::from_secs(10)))
    }

    pub fn leftover_artifacts(&self) -> Vec<PathBuf> {
        list(&self.artifacts_dir())
    }
}

pub fn list(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

fn next_script_id() -> String {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed).to_string()
}

pub fn success_script() -> String {
    format!("printf '{}' > \"$2\"", SAMPLE_CSV.replace('\n', "\\n"))
}

/// Builds a `multipart/form-data` body with a single file part.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = "tlgconvert-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
