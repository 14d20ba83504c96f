//! Storage trait for corpus backends

use crate::storage::{CorpusDocument, StoreResult};

/// Trait for corpus storage backends
///
/// A backend moves whole documents: the store always writes the complete
/// corpus, never a delta.
pub trait CorpusStorage {
    /// Loads the persisted document
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing persisted yet (a missing or empty file)
    /// * `Ok(Some(doc))` - The last saved document
    /// * `Err(StoreError)` - The backend could not be read or parsed
    fn load(&self) -> StoreResult<Option<CorpusDocument>>;

    /// Replaces the persisted document
    fn save(&mut self, document: &CorpusDocument) -> StoreResult<()>;
}
