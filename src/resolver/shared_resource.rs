//! Detection of packages contending for process-wide load slots.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{PackageInfo, name_key};

/// A load slot claimed by more than one package, or by a package while the
/// host already holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedResourceConflict {
    /// Slot name as first declared.
    pub slot: String,
    /// Packages claiming the slot, in input order.
    pub packages: Vec<PackageInfo>,
    /// Whether the host has reserved the slot.
    pub reserved: bool,
}

/// Finds shared-resource conflicts in a selected package set.
pub trait SharedResourceDetector: Send + Sync {
    /// Returns one entry per conflicting slot.
    fn detect_conflicts(&self, packages: &[PackageInfo]) -> Vec<SharedResourceConflict>;
}

/// Conflict detection over [`PackageInfo::shared_slots`].
///
/// A slot conflicts when two or more distinct package names claim it, or when
/// any package claims a slot the host has reserved.
#[derive(Debug, Clone, Default)]
pub struct SlotConflictDetector {
    reserved: BTreeSet<String>,
}

impl SlotConflictDetector {
    /// Creates a detector with no reserved slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a slot as already held by the host process.
    #[must_use]
    pub fn with_reserved_slot(mut self, slot: &str) -> Self {
        self.reserved.insert(name_key(slot));
        self
    }
}

impl SharedResourceDetector for SlotConflictDetector {
    fn detect_conflicts(&self, packages: &[PackageInfo]) -> Vec<SharedResourceConflict> {
        let mut claims: BTreeMap<String, (String, Vec<PackageInfo>)> = BTreeMap::new();
        for package in packages {
            for slot in &package.shared_slots {
                let (_, claimants) =
                    claims.entry(name_key(slot)).or_insert_with(|| (slot.clone(), Vec::new()));
                if !claimants.iter().any(|p| p.same_package(package)) {
                    claimants.push(package.clone());
                }
            }
        }

        claims
            .into_iter()
            .filter_map(|(key, (slot, claimants))| {
                let reserved = self.reserved.contains(&key);
                let distinct: BTreeSet<String> = claimants.iter().map(|p| name_key(&p.name)).collect();
                (reserved || distinct.len() > 1).then_some(SharedResourceConflict {
                    slot,
                    packages: claimants,
                    reserved,
                })
            })
            .collect()
    }
}
