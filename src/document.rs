use crate::errors::DbError;
use crate::types::DocumentId;
use bson::Document as BsonDocument;

/// Field holding the document's id inside its data.
pub const ID_FIELD: &str = "_id";

/// A stored document: the BSON body plus its parsed primary key.
///
/// The id is mirrored into the body under `_id` so filters can address it like any other field.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
}

impl Document {
    /// Wraps `data` under a fresh id, overwriting any `_id` it carried.
    #[must_use]
    pub fn new(mut data: BsonDocument) -> Self {
        let id = DocumentId::new();
        data.insert(ID_FIELD, id.to_string());
        Self { id, data }
    }

    /// Wraps `data` that already carries an `_id` string.
    ///
    /// # Errors
    /// Returns an error when `_id` is missing or is not a valid id.
    pub fn from_data(data: BsonDocument) -> Result<Self, DbError> {
        let id = data
            .get_str(ID_FIELD)
            .map_err(|_| DbError::InvalidDocumentId("<missing _id>".into()))?
            .parse::<DocumentId>()?;
        Ok(Self { id, data })
    }
}
