//! Git toolchain infrastructure.
//!
//! Provides the pinned git binary the repository prober shells out to, and
//! the [`release::ToolRunner`] implementation that runs it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Package download, signature verification, unpacking,
//! and child-process plumbing all live here. The [`release`] crate sees only
//! [`release::ToolRunner`].
//!
//! ## Provisioning
//!
//! The package is an rpm fetched from the regional package repository,
//! checked with `rpm -K`, and unpacked with `rpm2cpio | cpio` into a scratch
//! root. The host's own git, if any, is never used.

mod installation;
mod package;
mod provision;
mod runner;

pub use installation::GitInstallation;
pub use package::{ToolPackage, DEFAULT_PACKAGE_BUILD, DEFAULT_PACKAGE_FILE};
pub use provision::{ProvisionError, Provisioner};
pub use runner::ProcessRunner;
