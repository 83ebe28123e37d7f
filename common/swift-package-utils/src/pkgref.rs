use crate::vrs::{DecodeError, VersionRequirement};
use plist::{Dictionary, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The `isa` of a remote Swift package reference object.
pub const ISA: &str = "XCRemoteSwiftPackageReference";

const ISA_KEY: &str = "isa";
const REPOSITORY_URL_KEY: &str = "repositoryURL";
const REQUIREMENT_KEY: &str = "requirement";

/// Represents a Swift package dependency fetched from a remote repository.
///
/// Two references are equal when both their repository URLs and their
/// version requirements are equal.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RemoteSwiftPackageReference {
    pub repository_url: Option<String>,
    pub requirement: Option<VersionRequirement>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DecodePackageReferenceError {
    #[error("Package reference is not a dictionary")]
    NotADictionary,
    #[error("Expected an XCRemoteSwiftPackageReference object but found isa {0}")]
    UnexpectedIsa(String),
    #[error("Package reference `repositoryURL` is not a string")]
    RepositoryUrl,
    #[error("Package reference `requirement` is not a dictionary")]
    RequirementNotADictionary,
    #[error("Invalid package reference requirement: {0}")]
    Requirement(#[from] DecodeError),
}

impl RemoteSwiftPackageReference {
    #[must_use]
    pub fn new(repository_url: impl Into<String>, requirement: VersionRequirement) -> Self {
        RemoteSwiftPackageReference {
            repository_url: Some(repository_url.into()),
            requirement: Some(requirement),
        }
    }

    /// The package name derived from the repository URL: its last path
    /// component without a `.git` suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_package_utils::pkgref::RemoteSwiftPackageReference;
    /// use swift_package_utils::vrs::VersionRequirement;
    /// let reference = RemoteSwiftPackageReference::new(
    ///     "https://github.com/apple/swift-argument-parser.git",
    ///     VersionRequirement::Branch("main".to_string()),
    /// );
    /// assert_eq!(Some("swift-argument-parser"), reference.name());
    /// ```
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.repository_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .and_then(|url| url.rsplit('/').next())
            .map(|name| name.strip_suffix(".git").unwrap_or(name))
            .filter(|name| !name.is_empty())
    }

    /// Decodes a reference from a project file object. The `isa` key is
    /// optional, but when present it must name a remote package reference.
    ///
    /// # Errors
    ///
    /// See `DecodePackageReferenceError`. Errors from the nested requirement
    /// are wrapped rather than replaced with an absent requirement.
    pub fn decode(dict: &Dictionary) -> Result<Self, DecodePackageReferenceError> {
        if let Some(isa) = dict.get(ISA_KEY) {
            match isa.as_string() {
                Some(ISA) => (),
                Some(other) => {
                    return Err(DecodePackageReferenceError::UnexpectedIsa(other.to_string()))
                }
                None => return Err(DecodePackageReferenceError::UnexpectedIsa(format!("{isa:?}"))),
            }
        }

        let repository_url = dict
            .get(REPOSITORY_URL_KEY)
            .map(|url| {
                url.as_string()
                    .map(ToString::to_string)
                    .ok_or(DecodePackageReferenceError::RepositoryUrl)
            })
            .transpose()?;

        let requirement = dict
            .get(REQUIREMENT_KEY)
            .map(|requirement| {
                requirement
                    .as_dictionary()
                    .ok_or(DecodePackageReferenceError::RequirementNotADictionary)
                    .and_then(|requirement| {
                        VersionRequirement::try_from(requirement).map_err(|error| {
                            debug!(
                                url = repository_url.as_deref().unwrap_or_default(),
                                "Rejected package requirement: {error}"
                            );
                            DecodePackageReferenceError::Requirement(error)
                        })
                    })
            })
            .transpose()?;

        Ok(RemoteSwiftPackageReference {
            repository_url,
            requirement,
        })
    }

    /// Encodes the reference as a project file object. The requirement is
    /// nested as its own dictionary under the `requirement` key.
    #[must_use]
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert(ISA_KEY.to_string(), Value::from(ISA));
        if let Some(url) = &self.repository_url {
            dict.insert(REPOSITORY_URL_KEY.to_string(), Value::from(url.as_str()));
        }
        if let Some(requirement) = &self.requirement {
            dict.insert(
                REQUIREMENT_KEY.to_string(),
                Value::Dictionary(requirement.to_dictionary()),
            );
        }
        dict
    }
}

impl TryFrom<Value> for RemoteSwiftPackageReference {
    type Error = DecodePackageReferenceError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_dictionary()
            .ok_or(DecodePackageReferenceError::NotADictionary)
            .and_then(RemoteSwiftPackageReference::decode)
    }
}

impl From<RemoteSwiftPackageReference> for Value {
    fn from(reference: RemoteSwiftPackageReference) -> Self {
        Value::Dictionary(reference.to_dictionary())
    }
}
