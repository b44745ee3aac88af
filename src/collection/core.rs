use crate::document::Document;
use crate::types::DocumentId;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A named set of documents held in memory.
///
/// Each collection has its own lock; every single-document operation runs under one
/// acquisition of it, so a single-document update is atomic with respect to other requests.
pub struct Collection {
    name: String,
    pub(crate) docs: RwLock<BTreeMap<DocumentId, Document>>,
    text_fields: RwLock<Vec<String>>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(BTreeMap::new()),
            text_fields: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares the fields searched by `Filter::Text`. Replaces any previous declaration.
    pub fn set_text_index(&self, fields: &[&str]) {
        *self.text_fields.write() = fields.iter().map(|f| (*f).to_string()).collect();
    }

    #[must_use]
    pub fn text_fields(&self) -> Vec<String> {
        self.text_fields.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}
