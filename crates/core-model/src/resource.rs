use std::fmt;
use std::path::Path;

const FILE_SCHEME: &str = "file://";

/// Identity a model is bound to.
///
/// `Uri` is anything a caller supplies, typically a `file://` URI. `Anonymous`
/// is only minted by the registry for models created without a resource; it
/// displays as `inmemory://model/N` but never equals a caller-supplied `Uri`
/// with the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    Uri(String),
    Anonymous(u64),
}

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self::Uri(id.into())
    }

    /// `file://` identity for a filesystem path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::Uri(format!("{FILE_SCHEME}{}", path.as_ref().display()))
    }

    pub(crate) fn anonymous(n: u64) -> Self {
        Self::Anonymous(n)
    }

    /// Filesystem path for `file://` identities; `None` for every other scheme.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::Uri(uri) => uri.strip_prefix(FILE_SCHEME).map(Path::new),
            Self::Anonymous(_) => None,
        }
    }

    /// Registry-minted identity for a model created without a resource.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.write_str(uri),
            Self::Anonymous(n) => write!(f, "inmemory://model/{n}"),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
