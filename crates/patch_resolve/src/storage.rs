use derive_more::Debug;
use rustc_hash::FxHashMap;
use union_find::{QuickFindUf, UnionByRank, UnionFind};

/// A key into one `VarStorage`. Payload keys and unit keys live in separate
/// storages and are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("VarKey({_0:?})")]
pub(crate) struct VarKey(u32);

impl From<usize> for VarKey {
    #[inline]
    fn from(value: usize) -> Self {
        VarKey(u32::try_from(value).expect("VarKey overflow"))
    }
}

impl From<VarKey> for usize {
    #[inline]
    fn from(value: VarKey) -> Self {
        value.0 as usize
    }
}

/// Union-find over type variables of one component kind, with concrete
/// values attached to roots.
///
/// `union` is the only mutation surface besides key creation. A union of two
/// unequal concrete roots fails without merging — the caller records the
/// conflict and keeps scanning, so one bad edge doesn't hide the rest.
#[derive(Debug, Clone)]
pub(crate) struct VarStorage<T> {
    uf: QuickFindUf<UnionByRank>,
    values: FxHashMap<VarKey, T>,
}

impl<T: Clone + PartialEq> VarStorage<T> {
    pub fn new() -> Self {
        Self {
            uf: QuickFindUf::new(0),
            values: FxHashMap::default(),
        }
    }

    /// A fresh unbound variable.
    pub fn new_key(&mut self) -> VarKey {
        self.uf.insert(UnionByRank::default()).into()
    }

    /// A fresh variable already pinned to `value`.
    pub fn new_bound(&mut self, value: T) -> VarKey {
        let key = self.new_key();
        self.values.insert(key, value);
        key
    }

    pub fn find(&mut self, key: VarKey) -> VarKey {
        self.uf.find(key.into()).into()
    }

    /// The concrete value of `key`'s class, if any side of it has been
    /// pinned down.
    pub fn get(&mut self, key: VarKey) -> Option<T> {
        let root = self.find(key);
        self.values.get(&root).cloned()
    }

    /// Merge two classes. `Err((left, right))` when both roots already carry
    /// unequal concrete values; the classes are left untouched in that case.
    pub fn union(&mut self, lhs: VarKey, rhs: VarKey) -> Result<(), (T, T)> {
        let lhs = self.find(lhs);
        let rhs = self.find(rhs);
        if lhs == rhs {
            return Ok(());
        }

        let lhs_val = self.values.get(&lhs).cloned();
        let rhs_val = self.values.get(&rhs).cloned();
        let surviving = match (lhs_val, rhs_val) {
            (Some(l), Some(r)) if l != r => return Err((l, r)),
            (Some(v), _) | (_, Some(v)) => Some(v),
            (None, None) => None,
        };

        self.uf.union(lhs.into(), rhs.into());
        self.values.remove(&lhs);
        self.values.remove(&rhs);
        let root = self.find(lhs);
        if let Some(v) = surviving {
            self.values.insert(root, v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_propagates_concrete_value() {
        let mut storage: VarStorage<u32> = VarStorage::new();
        let a = storage.new_key();
        let b = storage.new_bound(7);
        assert_eq!(storage.get(a), None);
        storage.union(a, b).unwrap();
        assert_eq!(storage.get(a), Some(7));
        assert_eq!(storage.get(b), Some(7));
    }

    #[test]
    fn union_is_transitive_through_variables() {
        let mut storage: VarStorage<u32> = VarStorage::new();
        let a = storage.new_key();
        let b = storage.new_key();
        let c = storage.new_bound(3);
        storage.union(a, b).unwrap();
        storage.union(b, c).unwrap();
        assert_eq!(storage.get(a), Some(3));
    }

    #[test]
    fn conflicting_concretes_do_not_merge() {
        let mut storage: VarStorage<u32> = VarStorage::new();
        let a = storage.new_bound(1);
        let b = storage.new_bound(2);
        assert_eq!(storage.union(a, b), Err((1, 2)));
        // both classes keep their own value
        assert_eq!(storage.get(a), Some(1));
        assert_eq!(storage.get(b), Some(2));
    }

    #[test]
    fn equal_concretes_merge_fine() {
        let mut storage: VarStorage<u32> = VarStorage::new();
        let a = storage.new_bound(5);
        let b = storage.new_bound(5);
        storage.union(a, b).unwrap();
        assert_eq!(storage.get(a), Some(5));
    }
}
