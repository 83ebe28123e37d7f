use plist::{Dictionary, Value};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::trace;

const KIND_KEY: &str = "kind";
const REVISION_KEY: &str = "revision";
const BRANCH_KEY: &str = "branch";
// Shared by every single-version kind, not only `versionRange`.
const MINIMUM_VERSION_KEY: &str = "minimumVersion";
const MAXIMUM_VERSION_KEY: &str = "maximumVersion";

/// The version constraint a remote package reference places on its
/// dependency.
///
/// Version strings, branch names and revision ids are kept exactly as they
/// appear in the project file; nothing here interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum VersionRequirement {
    /// Versions from the given one up to, but excluding, the next major.
    UpToNextMajorVersion(String),
    /// Versions from the given one up to, but excluding, the next minor.
    UpToNextMinorVersion(String),
    /// Versions in the half-open range `[from, to)`.
    Range { from: String, to: String },
    /// Exactly the given version.
    Exact(String),
    /// The tip of a named branch.
    Branch(String),
    /// A single immutable revision, usually a commit hash.
    Revision(String),
}

/// The `kind` discriminator of an encoded `VersionRequirement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Revision,
    Branch,
    ExactVersion,
    VersionRange,
    UpToNextMinorVersion,
    UpToNextMajorVersion,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Version requirement is not a dictionary")]
    NotADictionary,
    #[error("Version requirement has no `kind` string")]
    MissingDiscriminator,
    #[error("Unrecognized version requirement kind: {0}")]
    UnrecognizedKind(String),
    #[error("Version requirement of kind {kind} is missing the `{field}` string")]
    MissingField { kind: Kind, field: &'static str },
}

impl Kind {
    /// The discriminator as written to the `kind` key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Revision => "revision",
            Kind::Branch => "branch",
            Kind::ExactVersion => "exactVersion",
            Kind::VersionRange => "versionRange",
            Kind::UpToNextMinorVersion => "upToNextMinorVersion",
            Kind::UpToNextMajorVersion => "upToNextMajorVersion",
        }
    }

    /// The payload keys a requirement of this kind carries, in the order
    /// they are written.
    #[must_use]
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Kind::Revision => &[REVISION_KEY],
            Kind::Branch => &[BRANCH_KEY],
            Kind::VersionRange => &[MINIMUM_VERSION_KEY, MAXIMUM_VERSION_KEY],
            Kind::ExactVersion | Kind::UpToNextMinorVersion | Kind::UpToNextMajorVersion => {
                &[MINIMUM_VERSION_KEY]
            }
        }
    }
}

impl FromStr for Kind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revision" => Ok(Kind::Revision),
            "branch" => Ok(Kind::Branch),
            "exactVersion" => Ok(Kind::ExactVersion),
            "versionRange" => Ok(Kind::VersionRange),
            "upToNextMinorVersion" => Ok(Kind::UpToNextMinorVersion),
            "upToNextMajorVersion" => Ok(Kind::UpToNextMajorVersion),
            _ => Err(DecodeError::UnrecognizedKind(s.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VersionRequirement {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            VersionRequirement::UpToNextMajorVersion(_) => Kind::UpToNextMajorVersion,
            VersionRequirement::UpToNextMinorVersion(_) => Kind::UpToNextMinorVersion,
            VersionRequirement::Range { .. } => Kind::VersionRange,
            VersionRequirement::Exact(_) => Kind::ExactVersion,
            VersionRequirement::Branch(_) => Kind::Branch,
            VersionRequirement::Revision(_) => Kind::Revision,
        }
    }

    /// Encodes the requirement as the `kind` key followed by its payload
    /// keys, ready to be nested in a package reference.
    #[must_use]
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert(KIND_KEY.to_string(), Value::from(self.kind().as_str()));
        match self {
            VersionRequirement::UpToNextMajorVersion(version)
            | VersionRequirement::UpToNextMinorVersion(version)
            | VersionRequirement::Exact(version) => {
                dict.insert(MINIMUM_VERSION_KEY.to_string(), Value::from(version.as_str()));
            }
            VersionRequirement::Range { from, to } => {
                dict.insert(MINIMUM_VERSION_KEY.to_string(), Value::from(from.as_str()));
                dict.insert(MAXIMUM_VERSION_KEY.to_string(), Value::from(to.as_str()));
            }
            VersionRequirement::Branch(name) => {
                dict.insert(BRANCH_KEY.to_string(), Value::from(name.as_str()));
            }
            VersionRequirement::Revision(id) => {
                dict.insert(REVISION_KEY.to_string(), Value::from(id.as_str()));
            }
        }
        dict
    }
}

impl TryFrom<&Dictionary> for VersionRequirement {
    type Error = DecodeError;

    /// Decodes a requirement from its `kind` discriminator and the payload
    /// keys that kind requires. Unrelated keys are ignored.
    ///
    /// # Errors
    ///
    /// See `DecodeError`. A requirement is never built with a missing field
    /// filled in.
    fn try_from(dict: &Dictionary) -> Result<Self, Self::Error> {
        let kind = dict
            .get(KIND_KEY)
            .and_then(Value::as_string)
            .ok_or(DecodeError::MissingDiscriminator)?
            .parse::<Kind>()?;

        let field = |name: &'static str| {
            dict.get(name)
                .and_then(Value::as_string)
                .map(ToString::to_string)
                .ok_or(DecodeError::MissingField { kind, field: name })
        };

        let requirement = match kind {
            Kind::Revision => VersionRequirement::Revision(field(REVISION_KEY)?),
            Kind::Branch => VersionRequirement::Branch(field(BRANCH_KEY)?),
            Kind::ExactVersion => VersionRequirement::Exact(field(MINIMUM_VERSION_KEY)?),
            Kind::VersionRange => VersionRequirement::Range {
                from: field(MINIMUM_VERSION_KEY)?,
                to: field(MAXIMUM_VERSION_KEY)?,
            },
            Kind::UpToNextMinorVersion => {
                VersionRequirement::UpToNextMinorVersion(field(MINIMUM_VERSION_KEY)?)
            }
            Kind::UpToNextMajorVersion => {
                VersionRequirement::UpToNextMajorVersion(field(MINIMUM_VERSION_KEY)?)
            }
        };
        trace!(%kind, "Decoded version requirement");
        Ok(requirement)
    }
}

impl TryFrom<Value> for VersionRequirement {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_dictionary()
            .ok_or(DecodeError::NotADictionary)
            .and_then(VersionRequirement::try_from)
    }
}

impl From<&VersionRequirement> for Dictionary {
    fn from(requirement: &VersionRequirement) -> Self {
        requirement.to_dictionary()
    }
}

impl From<VersionRequirement> for Value {
    fn from(requirement: VersionRequirement) -> Self {
        Value::Dictionary(requirement.to_dictionary())
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequirement::UpToNextMajorVersion(version) => {
                write!(f, "up to next major from {version}")
            }
            VersionRequirement::UpToNextMinorVersion(version) => {
                write!(f, "up to next minor from {version}")
            }
            VersionRequirement::Range { from, to } => write!(f, "{from}..<{to}"),
            VersionRequirement::Exact(version) => write!(f, "exactly {version}"),
            VersionRequirement::Branch(name) => write!(f, "branch {name}"),
            VersionRequirement::Revision(id) => write!(f, "revision {id}"),
        }
    }
}
