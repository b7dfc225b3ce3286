//! Variable reference table.
//!
//! The client addresses scopes and nested objects through opaque
//! integer references. References are allocated from a counter that
//! only moves forward; a reference is never reused within a session,
//! so a stale one from before a resume simply resolves to a stale
//! object handle rather than to the wrong entity.

use std::collections::HashMap;

/// What a variables reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarTarget {
    /// One scope of one call frame.
    Scope {
        /// Inspector handle of the scope's backing object.
        object_id: String,
        /// Index of the owning frame in the cached stack.
        frame_index: usize,
    },
    /// A plain object reached while expanding variables.
    Object {
        /// Inspector handle of the object.
        object_id: String,
    },
}

/// Allocates and resolves variables references.
#[derive(Debug, Default)]
pub struct VariableRefTable {
    next: i64,
    targets: HashMap<i64, VarTarget>,
}

impl VariableRefTable {
    /// Create an empty table. The first allocated reference is 1;
    /// 0 is reserved as DAP's "no children" marker.
    pub fn new() -> Self {
        Self {
            next: 1,
            targets: HashMap::new(),
        }
    }

    /// Allocate a reference for a frame scope.
    pub fn allocate_scope(&mut self, object_id: impl Into<String>, frame_index: usize) -> i64 {
        self.allocate(VarTarget::Scope {
            object_id: object_id.into(),
            frame_index,
        })
    }

    /// Allocate a reference for a nested object.
    pub fn allocate_object(&mut self, object_id: impl Into<String>) -> i64 {
        self.allocate(VarTarget::Object {
            object_id: object_id.into(),
        })
    }

    fn allocate(&mut self, target: VarTarget) -> i64 {
        let reference = self.next;
        self.next += 1;
        self.targets.insert(reference, target);
        reference
    }

    /// Resolve a reference.
    pub fn get(&self, reference: i64) -> Option<&VarTarget> {
        self.targets.get(&reference)
    }

    /// Number of live references.
    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varref_allocation_starts_at_one() {
        let mut table = VariableRefTable::new();
        assert_eq!(table.allocate_object("obj:1"), 1);
    }

    #[test]
    fn varref_strictly_increasing_and_distinct() {
        let mut table = VariableRefTable::new();
        let mut previous = 0;
        for i in 0..100 {
            let reference = if i % 2 == 0 {
                table.allocate_scope(format!("obj:{i}"), i)
            } else {
                table.allocate_object(format!("obj:{i}"))
            };
            assert!(reference > previous);
            previous = reference;
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn varref_resolution() {
        let mut table = VariableRefTable::new();
        let scope_ref = table.allocate_scope("obj:scope", 0);
        let object_ref = table.allocate_object("obj:nested");

        match table.get(scope_ref) {
            Some(VarTarget::Scope {
                object_id,
                frame_index,
            }) => {
                assert_eq!(object_id, "obj:scope");
                assert_eq!(*frame_index, 0);
            }
            other => panic!("expected scope target, got {other:?}"),
        }
        assert_eq!(
            table.get(object_ref),
            Some(&VarTarget::Object {
                object_id: "obj:nested".into()
            })
        );
        assert_eq!(table.get(999), None);
    }

    #[test]
    fn varref_never_reused() {
        let mut table = VariableRefTable::new();
        let first = table.allocate_object("obj:1");
        // Allocations for later pauses keep moving forward even though
        // earlier references still resolve.
        let second = table.allocate_scope("obj:2", 3);
        assert_ne!(first, second);
        assert!(table.get(first).is_some());
        assert!(table.get(second).is_some());
    }
}
