//! # Relationship Resolver
//!
//! Looks up the display name behind a foreign key.
//!
//! Resolution happens only when a dependent record is created; the name is
//! then frozen onto the record. Later renames of the parent do not
//! propagate, and deleted parents leave the frozen name in place.

use crate::{Record, RecordId};

/// A record that has a display name.
pub trait Named: Record {
    /// The record's display name.
    fn name(&self) -> &str;
}

/// Resolve `id` to the name of the matching record in `targets`.
///
/// Linear scan; returns `None` when no record has that id.
pub fn resolve_name<T: Named>(targets: &[T], id: RecordId) -> Option<String> {
    targets
        .iter()
        .find(|target| target.id() == id)
        .map(|target| target.name().to_string())
}

/// A draft paired with its parent's display name, frozen at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Linked<D> {
    pub draft: D,
    pub parent_name: Option<String>,
}

impl<D> Linked<D> {
    /// Pair a draft with an already-resolved parent name.
    #[must_use]
    pub fn new(draft: D, parent_name: Option<String>) -> Self {
        Self { draft, parent_name }
    }

    /// Resolve `parent_id` against `parents` and pair the result with `draft`.
    pub fn resolve<P: Named>(draft: D, parents: &[P], parent_id: RecordId) -> Self {
        Self::new(draft, resolve_name(parents, parent_id))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Carrier, CarrierDraft};

    fn carrier(id: u64, name: &str) -> Carrier {
        Carrier::assemble(
            RecordId(id),
            CarrierDraft {
                name: name.into(),
                ..CarrierDraft::default()
            },
        )
    }

    #[test]
    fn resolves_existing_id() {
        let carriers = vec![carrier(1, "Transportes Sur"), carrier(2, "Fletes Norte")];
        assert_eq!(
            resolve_name(&carriers, RecordId(2)).as_deref(),
            Some("Fletes Norte")
        );
    }

    #[test]
    fn missing_id_is_absent() {
        let carriers = vec![carrier(1, "Transportes Sur")];
        assert_eq!(resolve_name(&carriers, RecordId(99)), None);
        assert_eq!(resolve_name::<Carrier>(&[], RecordId(1)), None);
    }

    #[test]
    fn linked_resolve_freezes_name() {
        let carriers = vec![carrier(1, "Transportes Sur")];
        let linked = Linked::resolve((), &carriers, RecordId(1));
        assert_eq!(linked.parent_name.as_deref(), Some("Transportes Sur"));
    }
}
