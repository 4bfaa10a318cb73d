//! Cgroup v1 directory layout detection and path construction.
//!
//! Where a container's accounting files live under the cgroup root depends
//! on the cgroup driver the container runtime was started with. The
//! cgroupfs driver puts every container under a `docker/` directory per
//! controller; the systemd driver puts them under `system.slice/` in a
//! per-container scope.

use std::fmt;
use std::path::{Path, PathBuf};

/// The directory scheme used for per-container cgroup paths.
///
/// Detected once at startup and never re-evaluated, so a runtime that is
/// reconfigured mid-flight requires a restart to be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgroupLayout {
    /// `<root>/<controller>/docker/<id>/<file>` (cgroupfs driver).
    Legacy,
    /// `<root>/<controller>/system.slice/docker-<id>.scope/<file>`
    /// (systemd driver).
    SystemdSlice,
}

impl CgroupLayout {
    /// Probes `cgroup_root` for the layout in use: a `systemd` directory
    /// directly under the root marks a systemd-managed hierarchy.
    pub fn detect(cgroup_root: &Path) -> Self {
        if cgroup_root.join("systemd").is_dir() {
            Self::SystemdSlice
        } else {
            Self::Legacy
        }
    }

    /// Builds the path of one stats file for one container.
    ///
    /// No existence check is performed; callers probe the result themselves
    /// since an absent file is a normal condition.
    ///
    /// ```rust
    /// use std::path::Path;
    /// use docker_metrics::cgroup::CgroupLayout;
    ///
    /// let path = CgroupLayout::Legacy.stat_file_path(
    ///     Path::new("/sys/fs/cgroup"),
    ///     "memory",
    ///     "abc123",
    ///     "memory.stat",
    /// );
    /// assert_eq!(path, Path::new("/sys/fs/cgroup/memory/docker/abc123/memory.stat"));
    /// ```
    pub fn stat_file_path(
        self,
        cgroup_root: &Path,
        controller: &str,
        container_id: &str,
        filename: &str,
    ) -> PathBuf {
        match self {
            Self::Legacy => cgroup_root
                .join(controller)
                .join("docker")
                .join(container_id)
                .join(filename),
            Self::SystemdSlice => cgroup_root
                .join(controller)
                .join("system.slice")
                .join(format!("docker-{container_id}.scope"))
                .join(filename),
        }
    }
}

impl fmt::Display for CgroupLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::SystemdSlice => f.write_str("systemd-slice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_path() {
        let path = CgroupLayout::Legacy.stat_file_path(
            Path::new("/sys/fs/cgroup"),
            "memory",
            "abc123",
            "memory.stat",
        );
        assert_eq!(
            path,
            Path::new("/sys/fs/cgroup/memory/docker/abc123/memory.stat")
        );
    }

    #[test]
    fn test_systemd_slice_path() {
        let path = CgroupLayout::SystemdSlice.stat_file_path(
            Path::new("/sys/fs/cgroup"),
            "memory",
            "abc123",
            "memory.stat",
        );
        assert_eq!(
            path,
            Path::new("/sys/fs/cgroup/memory/system.slice/docker-abc123.scope/memory.stat")
        );
    }

    #[test]
    fn test_detect_without_systemd_dir() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(CgroupLayout::detect(root.path()), CgroupLayout::Legacy);
    }

    #[test]
    fn test_detect_with_systemd_dir() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("systemd")).unwrap();
        assert_eq!(CgroupLayout::detect(root.path()), CgroupLayout::SystemdSlice);
    }

    #[test]
    fn test_detect_ignores_systemd_file() {
        // Only a directory marks the systemd hierarchy.
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("systemd"), "").unwrap();
        assert_eq!(CgroupLayout::detect(root.path()), CgroupLayout::Legacy);
    }

    #[test]
    fn test_layout_display() {
        assert_eq!(CgroupLayout::Legacy.to_string(), "legacy");
        assert_eq!(CgroupLayout::SystemdSlice.to_string(), "systemd-slice");
    }
}
