//! Surfaces the navigation fix is applied to.
//!
//! A [`NavSurface`] is whatever holds the navigation markup: a directory of
//! built pages on disk, or a test double. The reactor only ever calls
//! [`NavSurface::apply`], as often as its triggers fire, so implementations
//! must be idempotent and cheap when nothing changed.

use std::collections::HashMap;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;

use crate::dom::NavFixer;

#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },
}

impl SurfaceError {
    /// Whether the error means a page or directory disappeared.
    fn is_not_found(&self) -> bool {
        match self {
            SurfaceError::ReadDir { source, .. }
            | SurfaceError::Read { source, .. }
            | SurfaceError::Write { source, .. } => source.kind() == ErrorKind::NotFound,
            SurfaceError::Encoding { .. } => false,
        }
    }
}

/// Outcome of one pass over a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Pages parsed and checked.
    pub pages_scanned: usize,
    /// Pages skipped because they did not change since the last pass.
    pub pages_unchanged: usize,
    /// Pages whose navigation text was rewritten.
    pub pages_written: usize,
    /// Text nodes rewritten across all pages.
    pub nodes_rewritten: usize,
    /// Pages that could not be read or written.
    pub pages_failed: usize,
}

impl ApplyReport {
    pub fn merge(&mut self, other: ApplyReport) {
        self.pages_scanned += other.pages_scanned;
        self.pages_unchanged += other.pages_unchanged;
        self.pages_written += other.pages_written;
        self.nodes_rewritten += other.nodes_rewritten;
        self.pages_failed += other.pages_failed;
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s) scanned, {} unchanged, {} written ({} label(s))",
            self.pages_scanned, self.pages_unchanged, self.pages_written, self.nodes_rewritten
        )?;
        if self.pages_failed > 0 {
            write!(f, ", {} failed", self.pages_failed)?;
        }
        Ok(())
    }
}

/// Something the navigation fix can be (re-)applied to.
pub trait NavSurface: Send {
    /// Apply the fix once.
    fn apply(&mut self) -> Result<ApplyReport, SurfaceError>;
}

// =============================================================================
// Site pages
// =============================================================================

/// Modified time and length of a page after it was last processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl PageStamp {
    fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// The HTML pages of a built site.
///
/// The root may be a directory, walked recursively, or a single page.
pub struct SitePages {
    root: PathBuf,
    fixer: NavFixer,
    dry_run: bool,
    stamps: HashMap<PathBuf, PageStamp>,
}

impl SitePages {
    pub fn new(root: impl Into<PathBuf>, fixer: NavFixer) -> Self {
        Self {
            root: root.into(),
            fixer,
            dry_run: false,
            stamps: HashMap::new(),
        }
    }

    /// Report what would change without writing anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Discover all pages under the root.
    pub fn discover(&self) -> Result<Vec<PathBuf>, SurfaceError> {
        let mut pages = Vec::new();
        if self.root.is_file() {
            pages.push(self.root.clone());
        } else {
            walk_pages(&self.root, &mut pages)?;
        }
        pages.sort();
        Ok(pages)
    }

    fn apply_to_page(&mut self, path: &Path) -> Result<ApplyReport, SurfaceError> {
        let mut report = ApplyReport::default();

        let stamp = PageStamp::of(path);
        if stamp.is_some() && self.stamps.get(path) == stamp.as_ref() {
            report.pages_unchanged = 1;
            return Ok(report);
        }

        let bytes = std::fs::read(path).map_err(|e| SurfaceError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let source = String::from_utf8(bytes).map_err(|_| SurfaceError::Encoding {
            path: path.to_path_buf(),
        })?;
        report.pages_scanned = 1;

        if let Some(fix) = self.fixer.fix_page(&source) {
            report.nodes_rewritten = fix.rewritten;
            if self.dry_run {
                tracing::info!(page = %path.display(), labels = fix.rewritten, "would rewrite");
                return Ok(report);
            }

            replace_page(path, &fix.html)?;
            report.pages_written = 1;
            tracing::debug!(page = %path.display(), labels = fix.rewritten, "rewrote navigation");
        }

        if let Some(stamp) = PageStamp::of(path) {
            self.stamps.insert(path.to_path_buf(), stamp);
        }

        Ok(report)
    }
}

impl NavSurface for SitePages {
    /// Fix every page. A page that cannot be processed is logged and counted
    /// in [`ApplyReport::pages_failed`]; only an unreadable root fails the pass.
    fn apply(&mut self) -> Result<ApplyReport, SurfaceError> {
        let pages = self.discover()?;
        self.stamps.retain(|path, _| pages.binary_search(path).is_ok());

        let mut report = ApplyReport::default();
        for page in &pages {
            match self.apply_to_page(page) {
                Ok(page_report) => report.merge(page_report),
                Err(e) if e.is_not_found() => {
                    // Removed mid-rebuild; the next trigger sees the new tree
                    tracing::debug!(page = %page.display(), "page vanished");
                    self.stamps.remove(page);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping page");
                    report.pages_failed += 1;

                    // Re-reading cannot fix the encoding until the page changes
                    if matches!(e, SurfaceError::Encoding { .. })
                        && let Some(stamp) = PageStamp::of(page)
                    {
                        self.stamps.insert(page.clone(), stamp);
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Replace a page in one step, so concurrent readers never see a partial
/// file. The page keeps its permissions.
fn replace_page(path: &Path, contents: &str) -> Result<(), SurfaceError> {
    let write_error = |source: std::io::Error| SurfaceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let permissions = std::fs::metadata(path).map_err(write_error)?.permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents.as_bytes()).map_err(write_error)?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

/// Whether a path looks like an HTML page.
pub fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// Recursively collect pages, skipping hidden files and directories.
fn walk_pages(dir: &Path, pages: &mut Vec<PathBuf>) -> Result<(), SurfaceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SurfaceError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| SurfaceError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            walk_pages(&path, pages)?;
        } else if path.is_file() && is_page(&path) {
            pages.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dom::NavSelectors;
    use crate::normalize::Normalizer;

    fn fixer() -> NavFixer {
        NavFixer::new(
            Arc::new(Normalizer::builtin().unwrap()),
            NavSelectors::standard().unwrap(),
        )
    }

    const NAV_PAGE: &str =
        r#"<html><body><a class="md-nav__link" href="/">user manual</a></body></html>"#;
    const PLAIN_PAGE: &str = r#"<html><body><p>user manual</p></body></html>"#;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("guides")).unwrap();
        std::fs::create_dir_all(dir.path().join(".cache")).unwrap();
        std::fs::write(dir.path().join("index.html"), NAV_PAGE).unwrap();
        std::fs::write(dir.path().join("guides/index.html"), NAV_PAGE).unwrap();
        std::fs::write(dir.path().join("plain.htm"), PLAIN_PAGE).unwrap();
        std::fs::write(dir.path().join("style.css"), "a { color: red }").unwrap();
        std::fs::write(dir.path().join(".cache/hidden.html"), NAV_PAGE).unwrap();
        dir
    }

    #[test]
    fn test_discover_pages() {
        let dir = site();
        let pages = SitePages::new(dir.path(), fixer()).discover().unwrap();

        let names: Vec<String> = pages
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["guides/index.html", "index.html", "plain.htm"]);
    }

    #[test]
    fn test_apply_writes_only_changed_pages() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());

        let report = pages.apply().unwrap();
        assert_eq!(report.pages_scanned, 3);
        assert_eq!(report.pages_written, 2);
        assert_eq!(report.nodes_rewritten, 2);

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(">User Manual</a>"));
        let plain = std::fs::read_to_string(dir.path().join("plain.htm")).unwrap();
        assert_eq!(plain, PLAIN_PAGE);
        let hidden = std::fs::read_to_string(dir.path().join(".cache/hidden.html")).unwrap();
        assert_eq!(hidden, NAV_PAGE);
    }

    #[test]
    fn test_second_pass_skips_unchanged_pages() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());
        pages.apply().unwrap();

        let report = pages.apply().unwrap();
        assert_eq!(report.pages_unchanged, 3);
        assert_eq!(report.pages_scanned, 0);
        assert_eq!(report.pages_written, 0);
    }

    #[test]
    fn test_replaced_page_is_fixed_again() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());
        pages.apply().unwrap();

        let replacement = NAV_PAGE.replace("user manual", "how to log in and more");
        std::fs::write(dir.path().join("index.html"), replacement).unwrap();

        let report = pages.apply().unwrap();
        assert_eq!(report.pages_written, 1);
        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(">How To Log In and More</a>"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer()).with_dry_run(true);

        let report = pages.apply().unwrap();
        assert_eq!(report.nodes_rewritten, 2);
        assert_eq!(report.pages_written, 0);
        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert_eq!(index, NAV_PAGE);
    }

    #[test]
    fn test_single_page_root() {
        let dir = site();
        let mut pages = SitePages::new(dir.path().join("guides/index.html"), fixer());

        let report = pages.apply().unwrap();
        assert_eq!(report.pages_scanned, 1);
        assert_eq!(report.pages_written, 1);
    }

    #[test]
    fn test_unreadable_page_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), b"\xff\xfe<a class=\"md-nav__link\">caf\xe9</a>")
            .unwrap();
        std::fs::write(dir.path().join("b.html"), NAV_PAGE).unwrap();
        let mut pages = SitePages::new(dir.path(), fixer());

        let report = pages.apply().unwrap();
        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.pages_written, 1);
        let fixed = std::fs::read_to_string(dir.path().join("b.html")).unwrap();
        assert!(fixed.contains(">User Manual</a>"));

        // The broken page is not retried until it changes.
        let report = pages.apply().unwrap();
        assert_eq!(report.pages_failed, 0);
        assert_eq!(report.pages_unchanged, 2);

        std::fs::write(dir.path().join("a.html"), NAV_PAGE.replace("user manual", "log in"))
            .unwrap();
        let report = pages.apply().unwrap();
        assert_eq!(report.pages_written, 1);
        assert_eq!(report.pages_failed, 0);
    }

    #[test]
    fn test_vanished_page_is_not_a_failure() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());

        let err = pages
            .apply_to_page(&dir.path().join("gone.html"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!SurfaceError::Encoding { path: PathBuf::from("a.html") }.is_not_found());
    }

    #[test]
    fn test_stamps_of_deleted_pages_are_dropped() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());
        pages.apply().unwrap();
        assert_eq!(pages.stamps.len(), 3);

        std::fs::remove_file(dir.path().join("guides/index.html")).unwrap();
        let report = pages.apply().unwrap();

        assert_eq!(report.pages_unchanged, 2);
        assert_eq!(pages.stamps.len(), 2);
        assert!(!pages.stamps.contains_key(&dir.path().join("guides/index.html")));
    }

    #[test]
    fn test_rewrite_leaves_no_temporary_files() {
        let dir = site();
        let mut pages = SitePages::new(dir.path(), fixer());
        pages.apply().unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".cache", "guides", "index.html", "plain.htm", "style.css"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = site();
        let index = dir.path().join("index.html");
        std::fs::set_permissions(&index, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut pages = SitePages::new(dir.path(), fixer());
        pages.apply().unwrap();

        let mode = std::fs::metadata(&index).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert!(std::fs::read_to_string(&index).unwrap().contains(">User Manual</a>"));
    }

    #[test]
    fn test_report_display() {
        let mut report = ApplyReport {
            pages_scanned: 3,
            pages_written: 1,
            nodes_rewritten: 2,
            ..ApplyReport::default()
        };
        assert_eq!(
            report.to_string(),
            "3 page(s) scanned, 0 unchanged, 1 written (2 label(s))"
        );

        report.merge(ApplyReport {
            pages_failed: 1,
            ..ApplyReport::default()
        });
        assert!(report.to_string().ends_with(", 1 failed"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut pages = SitePages::new(dir.path().join("missing"), fixer());
        assert!(matches!(pages.apply(), Err(SurfaceError::ReadDir { .. })));
    }
}
