//! Newtype domain identifiers.
//!
//! Every named thing the trigger handles is a distinct newtype wrapping a
//! primitive, so a [`PipelineName`] can never be passed where a
//! [`RepositoryName`] is expected even though both are strings underneath.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — repository coordinates
// ---------------------------------------------------------------------------

string_id! {
    /// The GitHub account or organisation that owns a repository.
    OwnerName
}

/// A repository name without its owner (e.g. `"widgets"`).
///
/// Also used as the directory name of the local shallow clone, so it must be
/// a single path component: separators, `.` and `..` are rejected along with
/// the empty string. GitHub does not allow any of these as repository names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Creates a repository name, returning `None` unless the value is a
    /// single non-empty path component.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let single_component =
            !v.is_empty() && v != "." && v != ".." && !v.contains(['/', '\\', '\0']);
        single_component.then_some(Self(v))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepositoryName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value.clone()).ok_or_else(|| format!("invalid repository name '{value}'"))
    }
}

impl From<RepositoryName> for String {
    fn from(name: RepositoryName) -> Self {
        name.0
    }
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"develop"`).
    BranchName
}

// ---------------------------------------------------------------------------
// Identifiers — cloud resources
// ---------------------------------------------------------------------------

string_id! {
    /// Names a deployment pipeline in the orchestration service.
    ///
    /// Supplied per invocation through the `pipelineName` event field.
    PipelineName
}

string_id! {
    /// Opaque identifier of a started pipeline execution.
    ///
    /// Returned by the orchestration service; logged and reported, never stored.
    ExecutionId
}

string_id! {
    /// Identifier of a secret in the managed secret store
    /// (e.g. `"/codebuild/github/oauth"`).
    SecretId
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single handler invocation.
///
/// Generated fresh for every event; recorded on the invocation span so all
/// log records from one invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_rejected() {
        assert!(PipelineName::new("").is_none());
        assert!(BranchName::new(String::new()).is_none());
    }

    #[test]
    fn display_matches_inner_value() {
        let name = PipelineName::new("release-pipeline").unwrap();
        assert_eq!(name.to_string(), "release-pipeline");
        assert_eq!(name.as_str(), "release-pipeline");
    }

    #[test]
    fn repository_name_is_a_single_path_component() {
        for bad in ["", ".", "..", "../tool", "/etc", "acme/widgets", "..\\tool", "a\0b"] {
            assert!(RepositoryName::new(bad).is_none(), "accepted {bad:?}");
        }
        for good in ["widgets", "widgets.rs", ".github", "my-repo_2"] {
            assert_eq!(RepositoryName::new(good).unwrap().as_str(), good);
        }
    }

    #[test]
    fn repository_name_deserialization_is_validated() {
        assert!(serde_json::from_str::<RepositoryName>(r#""../tool""#).is_err());
        let name: RepositoryName = serde_json::from_str(r#""widgets""#).unwrap();
        assert_eq!(name.as_str(), "widgets");
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
