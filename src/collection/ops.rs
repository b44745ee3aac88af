use super::core::Collection;
use crate::document::Document;
use crate::types::DocumentId;

impl Collection {
    pub fn insert_document(&self, document: Document) -> DocumentId {
        let doc_id = document.id.clone();
        self.docs.write().insert(doc_id.clone(), document);
        log::debug!("insert {}/{doc_id}", self.name());
        doc_id
    }

    #[must_use]
    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().get(id).cloned()
    }

    /// Runs `f` against the stored document while holding the write lock.
    ///
    /// Returns `None` when the document does not exist, otherwise whatever `f` returned.
    pub fn modify_document<R>(&self, id: &DocumentId, f: impl FnOnce(&mut Document) -> R) -> Option<R> {
        let mut docs = self.docs.write();
        docs.get_mut(id).map(f)
    }

    pub fn delete_document(&self, id: &DocumentId) -> bool {
        let removed = self.docs.write().remove(id).is_some();
        if removed {
            log::debug!("delete {}/{id}", self.name());
        }
        removed
    }

    #[must_use]
    pub fn get_all_documents(&self) -> Vec<Document> {
        self.docs.read().values().cloned().collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ID_FIELD;
    use bson::doc;

    #[test]
    fn modify_runs_under_the_lock_and_keeps_changes() {
        let col = Collection::new("t");
        let id = col.insert_document(Document::new(doc! {"k": 1}));
        let seen = col.modify_document(&id, |d| {
            d.data.insert("k", 2);
            d.data.get_i32("k").unwrap()
        });
        assert_eq!(seen, Some(2));
        let stored = col.find_document(&id).unwrap();
        assert_eq!(stored.data.get_i32("k").unwrap(), 2);
        assert_eq!(stored.data.get_str(ID_FIELD).unwrap(), id.to_string());
    }

    #[test]
    fn modify_missing_document_is_none() {
        let col = Collection::new("t");
        assert!(col.modify_document(&DocumentId::new(), |_| ()).is_none());
        assert!(!col.delete_document(&DocumentId::new()));
    }
}
