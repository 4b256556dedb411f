//! Pinned git package coordinates.

/// Package repository build the pinned rpm is published under.
pub const DEFAULT_PACKAGE_BUILD: &str = "ba2b87ec77c7";

/// Pinned git package filename.
pub const DEFAULT_PACKAGE_FILE: &str = "git-2.13.5-1.53.amzn1.x86_64.rpm";

/// Where to fetch the git package from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPackage {
    /// Region whose package repository serves the artifact.
    pub region: String,
    /// Repository build identifier.
    pub build: String,
    /// Package filename.
    pub file_name: String,
    /// Replaces `http://packages.<region>.amazonaws.com` when set.
    pub mirror: Option<String>,
}

impl ToolPackage {
    /// The pinned package served from `region`'s repository.
    pub fn pinned(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            build: DEFAULT_PACKAGE_BUILD.to_string(),
            file_name: DEFAULT_PACKAGE_FILE.to_string(),
            mirror: None,
        }
    }

    pub fn download_url(&self) -> String {
        let base = match &self.mirror {
            Some(mirror) => mirror.trim_end_matches('/').to_string(),
            None => format!("http://packages.{}.amazonaws.com", self.region),
        };
        format!(
            "{base}/2017.03/updates/{}/x86_64/Packages/{}",
            self.build, self.file_name
        )
    }
}
