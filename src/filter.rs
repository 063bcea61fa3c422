use std::path::Path;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use anyhow::{Context, Result};

/// Gitignore-style exclusion of created files, rooted at the source directory
pub struct FileFilter {
    matcher: Gitignore,
}

impl FileFilter {
    pub fn new<P: AsRef<Path>>(root_path: P, patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root_path.as_ref());
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        }
        let matcher = builder.build().context("Failed to build ignore matcher")?;

        Ok(Self { matcher })
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Whether a file at `relative` (a path under the root) should be copied.
    ///
    /// A pattern matching any parent directory excludes the file too.
    pub fn should_watch<P: AsRef<Path>>(&self, relative: P) -> bool {
        let relative = relative.as_ref();
        if self.matcher.is_empty() || relative.has_root() {
            return true;
        }

        !self
            .matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}
