//! Field-index routing between a wrapped tile and the one field appended to it
//!
//! A wrapper that appends a field after `n` wrapped fields owns index `n`;
//! every other index belongs to the wrapped component. The comparison is made
//! once here instead of at every call site.

use crate::identifiers::FieldId;

/// The single field appended after the wrapped tile's own fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SyntheticField {
    index: FieldId,
}

/// Who answers for a given field index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRoute {
    /// The appended field, handled by the wrapper itself
    Synthetic,
    /// A field of the wrapped component, forwarded unchanged
    Wrapped(FieldId),
}

impl SyntheticField {
    /// Synthetic field for a wrapped component with `wrapped_count` fields
    pub const fn after(wrapped_count: u32) -> Self {
        Self {
            index: FieldId::new(wrapped_count),
        }
    }

    /// Index of the synthetic field
    pub const fn index(&self) -> FieldId {
        self.index
    }

    /// Number of fields the wrapped component declares
    pub const fn wrapped_count(&self) -> u32 {
        self.index.index()
    }

    /// Field count the host sees, wrapped fields plus the synthetic one
    ///
    /// `None` when the wrapped count leaves no room for another field.
    pub const fn augmented_count(&self) -> Option<u32> {
        self.index.index().checked_add(1)
    }

    /// Decide who answers for `field`
    pub fn route(&self, field: FieldId) -> FieldRoute {
        if field == self.index {
            FieldRoute::Synthetic
        } else {
            FieldRoute::Wrapped(field)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_synthetic_follows_wrapped_fields() {
        let synthetic = SyntheticField::after(3);
        assert_eq!(synthetic.index(), FieldId::new(3));
        assert_eq!(synthetic.augmented_count(), Some(4));
        assert_eq!(synthetic.route(FieldId::new(3)), FieldRoute::Synthetic);
        assert_eq!(
            synthetic.route(FieldId::new(2)),
            FieldRoute::Wrapped(FieldId::new(2))
        );
    }

    #[test]
    fn test_empty_wrapped_tile() {
        let synthetic = SyntheticField::after(0);
        assert_eq!(synthetic.route(FieldId::new(0)), FieldRoute::Synthetic);
        assert_eq!(synthetic.augmented_count(), Some(1));
        assert_eq!(SyntheticField::after(u32::MAX).augmented_count(), None);
    }

    proptest! {
        #[test]
        fn synthetic_never_collides(count in 0u32..512, field in 0u32..1024) {
            let synthetic = SyntheticField::after(count);
            let route = synthetic.route(FieldId::new(field));
            if field == count {
                prop_assert_eq!(route, FieldRoute::Synthetic);
            } else {
                prop_assert_eq!(route, FieldRoute::Wrapped(FieldId::new(field)));
            }
        }

        #[test]
        fn wrapped_indices_always_forwarded(count in 1u32..512) {
            let synthetic = SyntheticField::after(count);
            for field in 0..count {
                prop_assert_eq!(
                    synthetic.route(FieldId::new(field)),
                    FieldRoute::Wrapped(FieldId::new(field))
                );
            }
        }
    }
}
