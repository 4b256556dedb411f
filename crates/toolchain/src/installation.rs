//! Filesystem layout of a provisioned git installation.

use std::path::{Path, PathBuf};

use release::ToolInvocation;

/// Location of a git tree unpacked under a private scratch root.
///
/// The package unpacks relative to the root, so the binary lands in
/// `usr/bin/git` and its helpers in `usr/libexec/git-core`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInstallation {
    root: PathBuf,
}

impl GitInstallation {
    /// Describes an installation rooted at `root`. Nothing is checked on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch root the package is unpacked into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `git` and its shell helpers; prepended to `PATH`.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("usr/bin")
    }

    pub fn git_binary(&self) -> PathBuf {
        self.bin_dir().join("git")
    }

    /// Templates copied into new repositories (`GIT_TEMPLATE_DIR`).
    pub fn template_dir(&self) -> PathBuf {
        self.root.join("usr/share/git-core/templates")
    }

    /// Sub-command binaries such as `git-remote-https` (`GIT_EXEC_PATH`).
    pub fn exec_path(&self) -> PathBuf {
        self.root.join("usr/libexec/git-core")
    }

    /// Home directory handed to git so no user or system config is read or
    /// written.
    pub fn home_dir(&self) -> PathBuf {
        self.root.join("home")
    }

    /// The complete environment for git child processes.
    pub fn isolated_env(&self) -> Vec<(String, String)> {
        vec![
            ("HOME".to_string(), self.home_dir().display().to_string()),
            (
                "GIT_TEMPLATE_DIR".to_string(),
                self.template_dir().display().to_string(),
            ),
            (
                "GIT_EXEC_PATH".to_string(),
                self.exec_path().display().to_string(),
            ),
            (
                "PATH".to_string(),
                format!("{}:/usr/bin:/bin", self.bin_dir().display()),
            ),
            ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
        ]
    }

    /// Starts a git invocation using this installation's binary and isolated
    /// environment.
    pub fn git(&self) -> ToolInvocation {
        ToolInvocation::new(self.git_binary()).isolated_env(self.isolated_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_in_scratch() {
        let install = GitInstallation::new("/tmp/scratch");
        assert_eq!(install.git_binary(), PathBuf::from("/tmp/scratch/usr/bin/git"));
        assert_eq!(
            install.exec_path(),
            PathBuf::from("/tmp/scratch/usr/libexec/git-core")
        );
        assert_eq!(
            install.template_dir(),
            PathBuf::from("/tmp/scratch/usr/share/git-core/templates")
        );
    }

    #[test]
    fn git_invocation_clears_inherited_environment() {
        let invocation = GitInstallation::new("/tmp/scratch").git();
        assert!(invocation.clear_env);
        assert!(invocation
            .env
            .contains(&("HOME".to_string(), "/tmp/scratch/home".to_string())));
        assert!(invocation
            .env
            .iter()
            .any(|(k, v)| k == "PATH" && v.starts_with("/tmp/scratch/usr/bin:")));
    }
}
