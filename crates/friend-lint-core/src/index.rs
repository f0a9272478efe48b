//! Pass-scoped cache of resolved friend lists.
//!
//! ```text
//! FriendIndex
//!   └── entries: DashMap<TypeId, Arc<FriendInfo>>
//! ```
//!
//! Entries are built lazily the first time a target type is looked up and
//! reused for the rest of the pass. Building is pure, so two workers racing
//! on the same uncached type may both build it; the map keeps the first
//! inserted value and both are identical.

use crate::annotation::FriendAnnotation;
use crate::model::{SemanticModel, TypeId};
use crate::types::Severity;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Resolved restriction of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendInfo {
    friends: BTreeSet<TypeId>,
    severity: Severity,
}

impl FriendInfo {
    /// Info for a type without a restriction annotation.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Returns the friend set.
    #[must_use]
    pub fn friends(&self) -> &BTreeSet<TypeId> {
        &self.friends
    }

    /// Severity of violations against this type.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether the type restricts access at all.
    #[must_use]
    pub fn has_friends(&self) -> bool {
        !self.friends.is_empty()
    }

    /// Whether `id` is on the friend list.
    #[must_use]
    pub fn is_friend(&self, id: TypeId) -> bool {
        self.friends.contains(&id)
    }
}

impl From<FriendAnnotation> for FriendInfo {
    fn from(annotation: FriendAnnotation) -> Self {
        Self {
            friends: annotation.friends,
            severity: annotation.severity,
        }
    }
}

/// Memoizing map from type identity to [`FriendInfo`].
///
/// Create one per analysis pass and drop it when the pass ends.
#[derive(Debug, Default)]
pub struct FriendIndex {
    entries: DashMap<TypeId, Arc<FriendInfo>>,
}

impl FriendIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the friend info of `target`, building it on first request.
    pub fn get_or_build<M>(&self, target: TypeId, model: &M) -> Arc<FriendInfo>
    where
        M: SemanticModel + ?Sized,
    {
        if let Some(hit) = self.entries.get(&target) {
            return Arc::clone(hit.value());
        }

        // Built outside the shard lock; a concurrent duplicate is harmless.
        let built = Arc::new(Self::build(target, model));
        let entry = self.entries.entry(target).or_insert(built);
        Arc::clone(entry.value())
    }

    /// Reads the annotation data of `target` into a [`FriendInfo`].
    ///
    /// Only the first attached annotation is considered.
    fn build<M>(target: TypeId, model: &M) -> FriendInfo
    where
        M: SemanticModel + ?Sized,
    {
        let annotations = model.annotations(target);
        if annotations.len() > 1 {
            debug!(
                "{:?} carries {} friend annotations; using the first",
                target,
                annotations.len()
            );
        }

        let info = annotations
            .first()
            .map_or_else(FriendInfo::unrestricted, |raw| {
                FriendAnnotation::from_raw(raw).into()
            });
        debug!(
            "Built friend info for {:?}: {} friend(s), {}",
            target,
            info.friends.len(),
            info.severity
        );
        info
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationArg, RawAnnotation, SeverityArg};
    use crate::model::{TypeSymbol, UsageSite};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A model with one annotated type and a lookup counter.
    struct CountingModel {
        annotations: Vec<Vec<RawAnnotation>>,
        lookups: AtomicUsize,
    }

    impl CountingModel {
        fn new(annotations: Vec<Vec<RawAnnotation>>) -> Self {
            Self {
                annotations,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl SemanticModel for CountingModel {
        fn symbol(&self, _id: TypeId) -> Option<&TypeSymbol> {
            None
        }

        fn annotations(&self, id: TypeId) -> &[RawAnnotation] {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.annotations
                .get(id.index())
                .map_or(&[] as &[RawAnnotation], Vec::as_slice)
        }

        fn usages(&self) -> &[UsageSite] {
            &[]
        }
    }

    fn restricted(friends: &[u32], severity: Option<Severity>) -> RawAnnotation {
        let mut args: Vec<AnnotationArg> = friends
            .iter()
            .map(|id| AnnotationArg::Type(TypeId::new(*id)))
            .collect();
        if let Some(severity) = severity {
            args.push(AnnotationArg::Severity(SeverityArg::Tag(severity)));
        }
        RawAnnotation::new(args)
    }

    #[test]
    fn unannotated_type_is_unrestricted() {
        let model = CountingModel::new(vec![vec![]]);
        let index = FriendIndex::new();

        let info = index.get_or_build(TypeId::new(0), &model);
        assert!(!info.has_friends());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn builds_once_then_hits_cache() {
        let model = CountingModel::new(vec![vec![restricted(&[1], None)]]);
        let index = FriendIndex::new();

        let first = index.get_or_build(TypeId::new(0), &model);
        let second = index.get_or_build(TypeId::new(0), &model);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(model.lookups.load(Ordering::SeqCst), 1);
        assert!(first.is_friend(TypeId::new(1)));
        assert_eq!(first.severity(), Severity::Error);
    }

    #[test]
    fn first_annotation_wins() {
        let model = CountingModel::new(vec![vec![
            restricted(&[1], Some(Severity::Warning)),
            restricted(&[2], Some(Severity::Error)),
        ]]);
        let info = FriendIndex::new().get_or_build(TypeId::new(0), &model);

        assert!(info.is_friend(TypeId::new(1)));
        assert!(!info.is_friend(TypeId::new(2)));
        assert_eq!(info.severity(), Severity::Warning);
    }

    #[test]
    fn annotation_without_types_does_not_restrict() {
        let model = CountingModel::new(vec![vec![RawAnnotation::new(vec![
            AnnotationArg::Other("42".to_string()),
        ])]]);
        let info = FriendIndex::new().get_or_build(TypeId::new(0), &model);
        assert!(!info.has_friends());
    }

    #[test]
    fn concurrent_lookups_agree() {
        let model = CountingModel::new(vec![
            vec![restricted(&[1, 2], Some(Severity::Warning))],
            vec![],
        ]);
        let index = FriendIndex::new();

        let results: Vec<Arc<FriendInfo>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let index = &index;
                    let model = &model;
                    scope.spawn(move || index.get_or_build(TypeId::new(i % 2), model))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("worker panicked"))
                .collect()
        });

        assert_eq!(index.len(), 2);
        for (i, info) in results.iter().enumerate() {
            let expected = index.get_or_build(TypeId::new(u32::try_from(i % 2).unwrap()), &model);
            assert_eq!(**info, *expected);
        }
    }

    #[test]
    fn fresh_index_starts_empty() {
        let model = CountingModel::new(vec![vec![restricted(&[1], None)]]);
        let first_pass = FriendIndex::new();
        let _ = first_pass.get_or_build(TypeId::new(0), &model);
        drop(first_pass);

        let second_pass = FriendIndex::new();
        assert!(second_pass.is_empty());
    }
}
