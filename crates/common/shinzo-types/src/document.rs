use std::rc::Rc;
use std::sync::Arc;

/// Name of the identifier field the store attaches to every document.
pub const DOC_ID_FIELD: &str = "_docID";

/// Access to the unique identifier of a caller-supplied record.
///
/// Attestation filtering is generic over document shape and only ever needs the id, so any
/// type returned from a query implements this trait instead of being inspected by field name.
pub trait Document {
    /// The document's `_docID`, or `None` when the record does not carry one.
    fn doc_id(&self) -> Option<&str>;
}

impl Document for serde_json::Value {
    fn doc_id(&self) -> Option<&str> {
        self.get(DOC_ID_FIELD).and_then(serde_json::Value::as_str)
    }
}

impl Document for serde_json::Map<String, serde_json::Value> {
    fn doc_id(&self) -> Option<&str> {
        self.get(DOC_ID_FIELD).and_then(serde_json::Value::as_str)
    }
}

impl<T: Document + ?Sized> Document for &T {
    fn doc_id(&self) -> Option<&str> {
        (**self).doc_id()
    }
}

impl<T: Document + ?Sized> Document for Box<T> {
    fn doc_id(&self) -> Option<&str> {
        (**self).doc_id()
    }
}

impl<T: Document + ?Sized> Document for Rc<T> {
    fn doc_id(&self) -> Option<&str> {
        (**self).doc_id()
    }
}

impl<T: Document + ?Sized> Document for Arc<T> {
    fn doc_id(&self) -> Option<&str> {
        (**self).doc_id()
    }
}
