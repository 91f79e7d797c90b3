//! Document and schema references (`@ref` on the wire)
//!
//! A reference names a document by id inside a collection, optionally scoped
//! to a child database. Schema collections themselves (`collections`,
//! `indexes`, `databases`, ...) are native refs with no parent collection.

use std::fmt;

/// A reference to a document, collection or other schema entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefV {
    id: String,
    collection: Option<Box<RefV>>,
    database: Option<Box<RefV>>,
}

impl RefV {
    /// A bare reference with no collection or database
    pub fn new(id: impl Into<String>) -> Self {
        RefV {
            id: id.into(),
            collection: None,
            database: None,
        }
    }

    /// A native schema collection (`collections`, `indexes`, `functions`, ...)
    pub fn native(id: impl Into<String>) -> Self {
        Self::new(id)
    }

    /// Reference to a user collection: `Ref(name, collections)`
    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(name).with_collection(Self::native("collections"))
    }

    /// Reference to an index: `Ref(name, indexes)`
    pub fn index(name: impl Into<String>) -> Self {
        Self::new(name).with_collection(Self::native("indexes"))
    }

    /// Reference to a document of `collection`
    pub fn document(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(id).with_collection(Self::collection(collection))
    }

    /// Set the parent collection
    pub fn with_collection(mut self, collection: RefV) -> Self {
        self.collection = Some(Box::new(collection));
        self
    }

    /// Scope the reference to a child database
    pub fn with_database(mut self, database: RefV) -> Self {
        self.database = Some(Box::new(database));
        self
    }

    /// The id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The parent collection, if any
    pub fn collection_ref(&self) -> Option<&RefV> {
        self.collection.as_deref()
    }

    /// The enclosing database, if any
    pub fn database_ref(&self) -> Option<&RefV> {
        self.database.as_deref()
    }

    /// True for schema collections that have no parent collection
    pub fn is_native(&self) -> bool {
        self.collection.is_none() && self.database.is_none()
    }
}

impl fmt::Display for RefV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref(id = {}", self.id)?;
        if let Some(c) = &self.collection {
            write!(f, ", collection = {}", c)?;
        }
        if let Some(d) = &self.database {
            write!(f, ", database = {}", d)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_chain() {
        let r = RefV::document("users", "123");
        assert_eq!(r.id(), "123");
        let users = r.collection_ref().unwrap();
        assert_eq!(users.id(), "users");
        assert_eq!(users.collection_ref().unwrap().id(), "collections");
        assert!(users.collection_ref().unwrap().is_native());
        assert!(!r.is_native());
    }

    #[test]
    fn test_database_scope_participates_in_equality() {
        let plain = RefV::collection("users");
        let scoped = RefV::collection("users").with_database(RefV::new("child"));
        assert_ne!(plain, scoped);
        assert_eq!(scoped.database_ref().map(RefV::id), Some("child"));
    }

    #[test]
    fn test_display() {
        let r = RefV::index("by_name");
        assert_eq!(r.to_string(), "Ref(id = by_name, collection = Ref(id = indexes))");
    }
}
