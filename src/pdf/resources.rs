//! Dictionaries that may live inline or behind an indirect reference
//!
//! A page's `/Resources` entry, and the `/ExtGState` entry inside it, can each
//! be a direct dictionary or a reference to one. [`DictSlot`] captures that
//! duality once so callers resolve and mutate without branching on it.

use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::Result;

/// Maximum depth walked up the page tree looking for inherited attributes
const MAX_INHERIT_DEPTH: usize = 64;

/// Where a dictionary lives
#[derive(Debug, Clone, PartialEq)]
pub enum DictSlot {
    /// Stored directly in the owning dictionary
    Inline(Dictionary),
    /// Stored in the document's object table
    ByReference(ObjectId),
}

impl DictSlot {
    /// Classify an entry value. Returns `None` for anything that cannot hold
    /// a dictionary (or a reference that doesn't resolve to one).
    pub fn from_object(doc: &Document, object: &Object) -> Option<Self> {
        match object {
            Object::Dictionary(dict) => Some(DictSlot::Inline(dict.clone())),
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Dictionary(_)) => Some(DictSlot::ByReference(*id)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Read the dictionary, following the reference if needed
    pub fn resolve<'a>(&'a self, doc: &'a Document) -> Result<&'a Dictionary> {
        match self {
            DictSlot::Inline(dict) => Ok(dict),
            DictSlot::ByReference(id) => Ok(doc.get_object(*id)?.as_dict()?),
        }
    }

    /// Apply `f` to the dictionary in place.
    ///
    /// Referenced dictionaries are edited in the object table, so every owner
    /// sharing that reference sees the change.
    pub fn modify<F, T>(&mut self, doc: &mut Document, f: F) -> Result<T>
    where
        F: FnOnce(&mut Dictionary) -> T,
    {
        match self {
            DictSlot::Inline(dict) => Ok(f(dict)),
            DictSlot::ByReference(id) => {
                let dict = doc.get_object_mut(*id)?.as_dict_mut()?;
                Ok(f(dict))
            }
        }
    }

    /// The value to store back into the owning dictionary
    pub fn into_object(self) -> Object {
        match self {
            DictSlot::Inline(dict) => Object::Dictionary(dict),
            DictSlot::ByReference(id) => Object::Reference(id),
        }
    }
}

/// Look up an inheritable page attribute (`MediaBox`, `Resources`, ...).
///
/// Checks the page itself, then walks `/Parent` links up the page tree.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;

    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }

        let parent_id = match current.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        current = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    }

    None
}

/// Follow a reference to the object it names, or return the object itself
pub fn dereference<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}
