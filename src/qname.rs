//! Qualified names for namespaced XML markup.
//!
//! A QName is the pair of namespace URI and local-name plus an optional
//! prefix. Identitaet haengt nur an URI + local-name — zwei QNames mit
//! gleichem URI und local-name sind gleich, egal welcher Prefix im
//! Quelldokument stand (Namespaces in XML 1.0 Sec. 6.2). `PartialEq`,
//! `Eq` und `Hash` ignorieren den Prefix daher konsequent.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::AHasher;

/// A qualified XML name: URI, local-name, and optional prefix.
///
/// `identity` ist ein vorberechneter 64-Bit-Hash von (uri, local_name).
/// Vermeidet wiederholtes String-Hashing beim Matchen im Tree-Walk.
#[derive(Clone)]
pub struct QName {
    /// The namespace URI. Empty string means no namespace.
    pub uri: Rc<str>,
    /// The local name.
    pub local_name: Rc<str>,
    /// The prefix as parsed from the document, if any.
    pub prefix: Option<Rc<str>>,
    identity: u64,
}

/// Berechnet den Identity-Hash fuer ein QName (uri + local_name).
pub(crate) fn compute_identity(uri: &str, local_name: &str) -> u64 {
    let mut hasher = AHasher::default();
    uri.hash(&mut hasher);
    local_name.hash(&mut hasher);
    hasher.finish()
}

impl QName {
    /// Creates a new QName with the given URI and local-name, without prefix.
    pub fn new(uri: impl Into<Rc<str>>, local_name: impl Into<Rc<str>>) -> Self {
        let uri = uri.into();
        let local_name = local_name.into();
        let identity = compute_identity(&uri, &local_name);
        Self {
            uri,
            local_name,
            prefix: None,
            identity,
        }
    }

    /// Creates a new QName with URI, local-name, and prefix.
    pub fn with_prefix(
        uri: impl Into<Rc<str>>,
        local_name: impl Into<Rc<str>>,
        prefix: impl Into<Rc<str>>,
    ) -> Self {
        let uri = uri.into();
        let local_name = local_name.into();
        let identity = compute_identity(&uri, &local_name);
        Self {
            uri,
            local_name,
            prefix: Some(prefix.into()),
            identity,
        }
    }

    /// Erstellt einen QName mit optionalem Prefix (Parser-Hilfsfunktion).
    pub(crate) fn with_optional_prefix(
        uri: Rc<str>,
        local_name: Rc<str>,
        prefix: Option<Rc<str>>,
    ) -> Self {
        let identity = compute_identity(&uri, &local_name);
        Self {
            uri,
            local_name,
            prefix,
            identity,
        }
    }

    /// Check against a (URI, local-name) pair without building a QName.
    #[inline]
    pub fn is(&self, uri: &str, local_name: &str) -> bool {
        &*self.local_name == local_name && &*self.uri == uri
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QName")
            .field("uri", &self.uri)
            .field("local_name", &self.local_name)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.uri == other.uri
            && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Display: `prefix:local_name` wenn Prefix vorhanden, sonst nur `local_name`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(pfx) if !pfx.is_empty() => write!(f, "{pfx}:{}", self.local_name),
            _ => f.write_str(&self.local_name),
        }
    }
}
