//! Filesystem operation handlers
//!
//! Each handler makes a single attempt, reports failures to the injected
//! [`DiagnosticSink`], and folds every error into an [`OperationResult`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use validator::Validate;

use crate::config::Config;
use crate::fs::diagnostics::{DiagnosticSink, TracingSink};
use crate::fs::types::{CreateDirectoryRequest, MoveFileRequest, OperationResult};

pub const CREATE_DIRECTORY: &str = "create_directory";
pub const MOVE_FILE: &str = "move_file";

/// Create `request.path` and any missing ancestors
pub fn create_directory(request: &CreateDirectoryRequest, sink: &dyn DiagnosticSink) -> OperationResult {
    let path = &request.path;
    let outcome = request
        .validate()
        .map_err(|e| e.to_string())
        .and_then(|()| fs::create_dir_all(path).map_err(|e| e.to_string()));

    match outcome {
        Ok(()) => {
            debug!(path = %path, "created directory");
            OperationResult::succeeded(format!("Created directory: {}", path))
        }
        Err(error) => {
            sink.operation_failed(
                CREATE_DIRECTORY,
                &format!("Failed to create directory {}", path),
                &error,
            );
            OperationResult::failed(error)
        }
    }
}

/// Move `request.source` to `request.destination`, creating the destination's
/// parent directories first
pub fn move_file(request: &MoveFileRequest, sink: &dyn DiagnosticSink) -> OperationResult {
    let (source, destination) = (&request.source, &request.destination);
    let outcome = request
        .validate()
        .map_err(|e| e.to_string())
        .and_then(|()| move_path(Path::new(source), Path::new(destination)).map_err(|e| e.to_string()));

    match outcome {
        Ok(()) => {
            debug!(source = %source, destination = %destination, "moved path");
            OperationResult::succeeded(format!("Moved {} to {}", source, destination))
        }
        Err(error) => {
            sink.operation_failed(
                MOVE_FILE,
                &format!("Failed to move file from {} to {}", source, destination),
                &error,
            );
            OperationResult::failed(error)
        }
    }
}

fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Create the directories the destination needs. A trailing separator names
/// the destination itself as a directory.
fn ensure_parent_exists(path: &Path) -> io::Result<()> {
    if ends_with_separator(path) {
        return fs::create_dir_all(path);
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Resolve the final location: an existing directory destination receives the
/// source inside it
fn resolve_target(source: &Path, destination: &Path) -> io::Result<PathBuf> {
    if !destination.is_dir() || same_file(source, destination) {
        return Ok(destination.to_path_buf());
    }

    let target = match source.file_name() {
        Some(name) => destination.join(name),
        None => return Ok(destination.to_path_buf()),
    };

    if target.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Destination path '{}' already exists", target.display()),
        ));
    }
    Ok(target)
}

fn move_path(source: &Path, destination: &Path) -> io::Result<()> {
    ensure_parent_exists(destination)?;
    let target = resolve_target(source, destination)?;

    let renamed = fs::rename(source, &target);
    settle_rename(renamed, source, &target)
}

/// Fall back to copy+delete when the rename failed only because the paths
/// live on different filesystems
fn settle_rename(renamed: io::Result<()>, source: &Path, target: &Path) -> io::Result<()> {
    match renamed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                source = %source.display(),
                target = %target.display(),
                "rename crosses filesystems, copying instead"
            );
            copy_then_remove(source, target)
        }
        Err(e) => Err(e),
    }
}

/// Copy `source` to `target` and delete `source` once the copy is complete
pub(crate) fn copy_then_remove(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(source)?;
    if metadata.is_dir() {
        copy_tree(source, target)?;
        fs::remove_dir_all(source)
    } else {
        copy_entry(source, target, &metadata)?;
        fs::remove_file(source)
    }
}

fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    fs::create_dir(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let dest = target.join(entry.file_name());
        if metadata.is_dir() {
            copy_tree(&entry.path(), &dest)?;
        } else {
            copy_entry(&entry.path(), &dest, &metadata)?;
        }
    }
    fs::set_permissions(target, fs::metadata(source)?.permissions())
}

#[cfg(unix)]
fn copy_entry(source: &Path, target: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    if metadata.file_type().is_symlink() {
        let link = fs::read_link(source)?;
        return std::os::unix::fs::symlink(link, target);
    }
    fs::copy(source, target).map(|_| ())
}

#[cfg(not(unix))]
fn copy_entry(source: &Path, target: &Path, _metadata: &fs::Metadata) -> io::Result<()> {
    fs::copy(source, target).map(|_| ())
}

/// The filesystem tool set bound to its diagnostic sink
pub struct FileSystemTools {
    home_dir: PathBuf,
    sink: Arc<dyn DiagnosticSink>,
}

impl FileSystemTools {
    pub fn new(config: &Config, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            home_dir: config.home_dir.clone(),
            sink,
        }
    }

    /// Tool set that reports failures through `tracing`
    pub fn with_tracing(config: &Config) -> Self {
        Self::new(config, Arc::new(TracingSink))
    }

    /// Home directory captured at startup
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn create_directory(&self, request: &CreateDirectoryRequest) -> OperationResult {
        create_directory(request, self.sink.as_ref())
    }

    pub fn move_file(&self, request: &MoveFileRequest) -> OperationResult {
        move_file(request, self.sink.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::diagnostics::MemorySink;
    use tempfile::tempdir;

    fn mkdir_request(path: &Path) -> CreateDirectoryRequest {
        CreateDirectoryRequest {
            path: path.to_string_lossy().into_owned(),
        }
    }

    fn move_request(source: &Path, destination: &Path) -> MoveFileRequest {
        MoveFileRequest {
            source: source.to_string_lossy().into_owned(),
            destination: destination.to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn test_create_directory_with_missing_ancestors() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("c");
        let sink = MemorySink::new();

        let result = create_directory(&mkdir_request(&target), &sink);

        assert!(result.success);
        assert_eq!(
            result.message.as_deref(),
            Some(format!("Created directory: {}", target.display()).as_str())
        );
        assert!(dir.path().join("a").is_dir());
        assert!(dir.path().join("a/b").is_dir());
        assert!(target.is_dir());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_create_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("existing");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "contents").unwrap();
        let sink = MemorySink::new();

        let result = create_directory(&mkdir_request(&target), &sink);

        assert!(result.success);
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "contents");
        assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
    }

    #[test]
    fn test_create_directory_under_regular_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let sink = MemorySink::new();

        let result = create_directory(&mkdir_request(&blocker.join("child")), &sink);

        assert!(!result.success);
        assert!(result.message.is_none());
        assert!(!result.error.as_deref().unwrap_or_default().is_empty());
        assert!(result.is_well_formed());

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, CREATE_DIRECTORY);
        assert!(entries[0].context.contains("blocker"));
    }

    #[test]
    fn test_create_directory_on_existing_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let result = create_directory(&mkdir_request(&file), &MemorySink::new());

        assert!(!result.success);
        assert!(file.is_file());
    }

    #[test]
    fn test_create_directory_empty_path_fails() {
        let sink = MemorySink::new();
        let result = create_directory(&CreateDirectoryRequest { path: String::new() }, &sink);

        assert!(!result.success);
        assert!(result.error.unwrap().contains("path must not be empty"));
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_move_file_creates_destination_parents() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("x.txt");
        let destination = dir.path().join("sub").join("deeper").join("y.txt");
        fs::write(&source, "payload").unwrap();
        let sink = MemorySink::new();

        let result = move_file(&move_request(&source, &destination), &sink);

        assert!(result.success, "{:?}", result);
        assert_eq!(
            result.message.unwrap(),
            format!("Moved {} to {}", source.display(), destination.display())
        );
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "payload");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_move_missing_source_fails() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("ghost.txt");
        let destination = dir.path().join("out").join("ghost.txt");
        let sink = MemorySink::new();

        let result = move_file(&move_request(&source, &destination), &sink);

        assert!(!result.success);
        assert!(!result.error.as_deref().unwrap_or_default().is_empty());
        assert!(!destination.exists());

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, MOVE_FILE);
        assert!(entries[0].context.starts_with("Failed to move file from"));
    }

    #[test]
    fn test_move_directory_tree() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tree");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("nested/leaf.txt"), "leaf").unwrap();
        let destination = dir.path().join("moved").join("tree");

        let result = move_file(&move_request(&source, &destination), &MemorySink::new());

        assert!(result.success);
        assert!(!source.exists());
        assert_eq!(
            fs::read_to_string(destination.join("nested/leaf.txt")).unwrap(),
            "leaf"
        );
    }

    #[test]
    fn test_move_into_existing_directory() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("report.txt");
        let bucket = dir.path().join("bucket");
        fs::write(&source, "data").unwrap();
        fs::create_dir(&bucket).unwrap();

        let result = move_file(&move_request(&source, &bucket), &MemorySink::new());

        assert!(result.success);
        assert_eq!(fs::read_to_string(bucket.join("report.txt")).unwrap(), "data");
        assert!(!source.exists());
    }

    #[test]
    fn test_move_into_directory_with_existing_entry_fails() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("report.txt");
        let bucket = dir.path().join("bucket");
        fs::write(&source, "new").unwrap();
        fs::create_dir(&bucket).unwrap();
        fs::write(bucket.join("report.txt"), "old").unwrap();

        let result = move_file(&move_request(&source, &bucket), &MemorySink::new());

        assert!(!result.success);
        assert!(result.error.unwrap().contains("already exists"));
        assert_eq!(fs::read_to_string(bucket.join("report.txt")).unwrap(), "old");
        assert!(source.exists());
    }

    #[test]
    fn test_move_to_trailing_separator_creates_directory() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("x.txt");
        fs::write(&source, "payload").unwrap();
        let destination = format!("{}/newdir/", dir.path().display());
        let request = MoveFileRequest {
            source: source.to_string_lossy().into_owned(),
            destination,
        };

        let result = move_file(&request, &MemorySink::new());

        assert!(result.success, "{:?}", result);
        assert!(dir.path().join("newdir").is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join("newdir/x.txt")).unwrap(),
            "payload"
        );
        assert!(!source.exists());
    }

    #[test]
    fn test_move_directory_onto_itself() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("d");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner.txt"), "i").unwrap();
        let sink = MemorySink::new();

        let result = move_file(&move_request(&target, &target), &sink);

        assert!(result.success, "{:?}", result);
        assert!(sink.is_empty());
        assert_eq!(fs::read_to_string(target.join("inner.txt")).unwrap(), "i");
        assert!(!target.join("d").exists());
    }

    #[test]
    fn test_cross_device_rename_falls_back_to_copy() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("far.txt");
        let target = dir.path().join("near.txt");
        fs::write(&source, "across").unwrap();

        let renamed = Err(io::Error::from(io::ErrorKind::CrossesDevices));
        settle_rename(renamed, &source, &target).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "across");
    }

    #[test]
    fn test_other_rename_errors_are_reported() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("stay.txt");
        let target = dir.path().join("never.txt");
        fs::write(&source, "here").unwrap();

        let renamed = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        let err = settle_rename(renamed, &source, &target).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_copy_then_remove_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.bin");
        let target = dir.path().join("b.bin");
        fs::write(&source, [1u8, 2, 3]).unwrap();

        copy_then_remove(&source, &target).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&target).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_copy_then_remove_tree() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        fs::create_dir_all(source.join("one/two")).unwrap();
        fs::write(source.join("root.txt"), "r").unwrap();
        fs::write(source.join("one/two/deep.txt"), "d").unwrap();
        let target = dir.path().join("dst");

        copy_then_remove(&source, &target).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(target.join("root.txt")).unwrap(), "r");
        assert_eq!(fs::read_to_string(target.join("one/two/deep.txt")).unwrap(), "d");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_then_remove_preserves_symlinks() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        std::os::unix::fs::symlink("missing-target", source.join("link")).unwrap();
        let target = dir.path().join("dst");

        copy_then_remove(&source, &target).unwrap();

        let link = fs::read_link(target.join("link")).unwrap();
        assert_eq!(link, PathBuf::from("missing-target"));
    }

    #[test]
    fn test_tools_use_injected_sink() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(MemorySink::new());
        let tools = FileSystemTools::new(&Config::with_home_dir(dir.path()), sink.clone());

        assert_eq!(tools.home_dir(), dir.path());

        let result = tools.move_file(&move_request(&dir.path().join("nope"), &dir.path().join("x")));
        assert!(!result.success);
        assert_eq!(sink.entries().len(), 1);
    }
}
