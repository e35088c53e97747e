//! Resolution of the running executable's path.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute path of the running executable, as invoked.
///
/// Resolves `argv[0]` against the working directory. Falls back to the
/// invocation string itself when that fails.
pub fn exe_path() -> PathBuf {
    let prog = std::env::args_os().next().unwrap_or_default();
    exe_path_from_path(prog)
}

/// Absolute, lexically cleaned form of `prog`.
///
/// Never fails: if the working directory cannot be determined, `prog` is
/// returned unchanged.
pub fn exe_path_from_path(prog: impl AsRef<Path>) -> PathBuf {
    resolve(prog.as_ref(), std::env::current_dir)
}

fn resolve<F>(prog: &Path, cwd: F) -> PathBuf
where
    F: FnOnce() -> io::Result<PathBuf>,
{
    if prog.is_absolute() {
        return clean(prog);
    }
    match cwd() {
        Ok(dir) => clean(&dir.join(prog)),
        Err(e) => {
            tracing::debug!(path = %prog.display(), error = %e, "Cannot resolve absolute path");
            prog.to_path_buf()
        }
    }
}

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root is the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_becomes_absolute() {
        let path = exe_path_from_path("./app");
        assert!(path.is_absolute());
        assert!(path.ends_with("app"));
        assert_eq!(path, std::env::current_dir().unwrap().join("app"));
    }

    #[test]
    fn test_parent_components_fold() {
        let path = resolve(Path::new("bin/../app"), || Ok(PathBuf::from("/srv")));
        assert_eq!(path, PathBuf::from("/srv/app"));
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean(Path::new("/../../app")), PathBuf::from("/app"));
    }

    #[test]
    fn test_leading_parents_kept_on_relative_paths() {
        assert_eq!(clean(Path::new("../../app")), PathBuf::from("../../app"));
        assert_eq!(clean(Path::new("a/../../app")), PathBuf::from("../app"));
    }

    #[test]
    fn test_failure_returns_input_unchanged() {
        let path = resolve(Path::new("relative/app"), || {
            Err(io::Error::new(io::ErrorKind::NotFound, "cwd removed"))
        });
        assert_eq!(path, PathBuf::from("relative/app"));
        assert_eq!(path.to_str(), Some("relative/app"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_input_skips_cwd() {
        let path = resolve(Path::new("/usr/./bin/app"), || {
            panic!("working directory must not be consulted")
        });
        assert_eq!(path, PathBuf::from("/usr/bin/app"));
    }

    #[test]
    fn test_current_exe_resolves() {
        assert!(exe_path().is_absolute());
    }
}
