//! Name-based diff between two package sets.

use std::collections::BTreeMap;

use crate::models::{PackageInfo, name_key};

/// Packages added, removed and updated between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDiff {
    /// Present after, absent before.
    pub added: Vec<PackageInfo>,
    /// Present before, absent after.
    pub removed: Vec<PackageInfo>,
    /// `(before, after)` pairs whose version changed.
    pub updated: Vec<(PackageInfo, PackageInfo)>,
}

impl PackageDiff {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

fn by_name(packages: &[PackageInfo]) -> BTreeMap<String, &PackageInfo> {
    let mut map: BTreeMap<String, &PackageInfo> = BTreeMap::new();
    for package in packages {
        let entry = map.entry(name_key(&package.name)).or_insert(package);
        if package.version > entry.version {
            *entry = package;
        }
    }
    map
}

/// Compares two snapshots by case-insensitive name.
///
/// A version change on a name present in both is an update, never a removal
/// plus an addition. When a snapshot holds several versions of a name, the
/// newest one is compared.
#[must_use]
pub fn diff_packages(before: &[PackageInfo], after: &[PackageInfo]) -> PackageDiff {
    let before = by_name(before);
    let after = by_name(after);
    let mut diff = PackageDiff::default();

    for (key, old) in &before {
        match after.get(key) {
            None => diff.removed.push((*old).clone()),
            Some(new) if new.version != old.version => diff.updated.push(((*old).clone(), (*new).clone())),
            Some(_) => {}
        }
    }
    for (key, new) in &after {
        if !before.contains_key(key) {
            diff.added.push((*new).clone());
        }
    }
    diff
}
