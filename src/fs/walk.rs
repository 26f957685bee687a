//! Traversal used by the ownership sweep.
use std::path::Path;

use walkdir::WalkDir;

/// Walk everything under `root` (inclusive) without following symlinks.
///
/// With `one_filesystem`, directories on a different device than `root` are
/// neither descended into nor yielded, which keeps network mounts, other
/// partitions and pseudo-filesystems like `/proc` out of the sweep.
pub fn device_walker(root: &Path, one_filesystem: bool) -> walkdir::IntoIter {
    WalkDir::new(root)
        .follow_links(false)
        .same_file_system(one_filesystem)
        .into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_root_and_dangling_symlinks_without_following() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        std::fs::create_dir_all(root.join("a/b")).unwrap();
        std::fs::write(root.join("a/b/f"), b"x").unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", root.join("a/dangling")).unwrap();
        std::os::unix::fs::symlink(root.join("a"), root.join("loop")).unwrap();

        let seen: Vec<_> = device_walker(root, true)
            .filter_map(|e| e.ok())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert!(seen.contains(&Path::new("").to_path_buf()));
        assert!(seen.contains(&Path::new("a/b/f").to_path_buf()));
        assert!(seen.contains(&Path::new("a/dangling").to_path_buf()));
        assert!(seen.contains(&Path::new("loop").to_path_buf()));
        assert!(!seen.iter().any(|p| p.starts_with("loop/")));
    }
}
