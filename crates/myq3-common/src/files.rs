// files.rs -- game file access
//
// The level decoder never opens files itself: it asks a `FileSystem` for
// the whole file and drops the buffer once decoding is done.

use log::debug;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Whole-file loader used by the level decoder.
pub trait FileSystem {
    /// Loads `name` (a game-relative path such as `maps/q3dm1.bsp`) in full.
    fn load_file(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Rejects names that could escape the search path roots.
fn check_game_path(name: &str) -> io::Result<()> {
    let invalid = name.is_empty()
        || Path::new(name)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to open \"{}\"", name),
        ));
    }
    Ok(())
}

/// A link that redirects file lookups from one prefix to another directory.
#[derive(Debug, Clone)]
pub struct FileLink {
    pub from: String,
    pub to: PathBuf,
}

/// Directory-backed file system. Search paths are tried newest first and
/// the first hit wins.
#[derive(Debug, Default)]
pub struct DirFileSystem {
    search_paths: Vec<PathBuf>,
    links: Vec<FileLink>,
}

impl DirFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory with higher priority than every existing one.
    pub fn add_game_directory(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        debug!("Added search path {}", dir.display());
        self.search_paths.insert(0, dir);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Redirects every lookup starting with `from` into `to`. An empty `to`
    /// removes an existing link.
    pub fn link(&mut self, from: &str, to: &str) {
        if let Some(pos) = self.links.iter().position(|l| l.from == from) {
            if to.is_empty() {
                self.links.remove(pos);
            } else {
                self.links[pos].to = PathBuf::from(to);
            }
            return;
        }
        if !to.is_empty() {
            self.links.push(FileLink {
                from: from.to_string(),
                to: PathBuf::from(to),
            });
        }
    }

    fn find_file(&self, name: &str) -> io::Result<PathBuf> {
        for link in &self.links {
            if let Some(rest) = name.strip_prefix(link.from.as_str()) {
                let path = link.to.join(rest);
                if path.is_file() {
                    debug!("link file: {}", path.display());
                    return Ok(path);
                }
                return Err(not_found(name));
            }
        }

        for dir in &self.search_paths {
            let path = dir.join(name);
            if path.is_file() {
                debug!("FindFile: {}", path.display());
                return Ok(path);
            }
        }

        debug!("FindFile: can't find {}", name);
        Err(not_found(name))
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name))
}

impl FileSystem for DirFileSystem {
    fn load_file(&self, name: &str) -> io::Result<Vec<u8>> {
        check_game_path(name)?;
        let path = self.find_file(name)?;
        fs::read(path)
    }
}

/// In-memory file system for tools and tests.
#[derive(Debug, Default)]
pub struct MemFileSystem {
    files: HashMap<String, Vec<u8>>,
    reads: AtomicUsize,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    /// Number of `load_file` calls made so far, successful or not.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl FileSystem for MemFileSystem {
    fn load_file(&self, name: &str) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        check_game_path(name)?;
        self.files.get(name).cloned().ok_or_else(|| not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_paths() {
        assert!(check_game_path("maps/test.bsp").is_ok());
        assert!(check_game_path("").is_err());
        assert!(check_game_path("../secret").is_err());
        assert!(check_game_path("maps/../../secret").is_err());
        assert!(check_game_path("/etc/passwd").is_err());
    }

    #[test]
    fn later_directories_take_priority() {
        let base = tempfile::tempdir().unwrap();
        let mod_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(base.path().join("maps")).unwrap();
        fs::create_dir_all(mod_dir.path().join("maps")).unwrap();
        fs::write(base.path().join("maps/a.bsp"), b"base").unwrap();
        fs::write(base.path().join("maps/b.bsp"), b"only base").unwrap();
        fs::write(mod_dir.path().join("maps/a.bsp"), b"mod").unwrap();

        let mut fs = DirFileSystem::new();
        fs.add_game_directory(base.path());
        fs.add_game_directory(mod_dir.path());

        assert_eq!(fs.load_file("maps/a.bsp").unwrap(), b"mod");
        assert_eq!(fs.load_file("maps/b.bsp").unwrap(), b"only base");
        assert_eq!(
            fs.load_file("maps/c.bsp").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn links_redirect_lookups() {
        let base = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        fs::write(other.path().join("x.bsp"), b"linked").unwrap();

        let mut fs = DirFileSystem::new();
        fs.add_game_directory(base.path());
        fs.link("maps/", other.path().to_str().unwrap());
        assert_eq!(fs.load_file("maps/x.bsp").unwrap(), b"linked");

        fs.link("maps/", "");
        assert!(fs.load_file("maps/x.bsp").is_err());
    }

    #[test]
    fn mem_file_system_counts_reads() {
        let mut fs = MemFileSystem::new();
        fs.insert("maps/a.bsp", vec![1, 2, 3]);
        assert_eq!(fs.reads(), 0);
        assert_eq!(fs.load_file("maps/a.bsp").unwrap(), vec![1, 2, 3]);
        assert!(fs.load_file("maps/missing.bsp").is_err());
        assert_eq!(fs.reads(), 2);
    }
}
