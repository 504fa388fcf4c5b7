//! 共享安全的不可变集合适配器
//!
//! 包装普通哈希集合，每次代数运算都分配全新的底层集合；
//! 任何已发出的实例都不会观察到后续变更

use std::collections::hash_set;
use std::collections::HashSet;
use std::hash::Hash;

/// 共享安全的不可变哈希集合
///
/// 以复制换取强保证：变更运算返回的新实例与原实例之间
/// 不共享任何内部状态，可作为长生命周期的公开快照发出。
/// 有意放弃持久化结构的共享效率
#[derive(Debug, Clone, Default)]
pub struct NonSharingHashSet<T: Eq + Hash + Clone> {
    set: HashSet<T>,
}

impl<T: Eq + Hash + Clone> NonSharingHashSet<T> {
    /// 创建空集合
    pub fn new() -> Self {
        Self {
            set: HashSet::new(),
        }
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// 加入元素，返回新集合
    pub fn insert(&self, value: T) -> Self {
        let mut set = self.set.clone();
        set.insert(value);
        Self { set }
    }

    /// 移除元素，返回新集合
    pub fn remove(&self, value: &T) -> Self {
        let mut set = self.set.clone();
        set.remove(value);
        Self { set }
    }

    /// 清空，返回新集合
    pub fn clear(&self) -> Self {
        Self::new()
    }

    /// 并集，返回新集合
    pub fn union<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut set = self.set.clone();
        set.extend(other);
        Self { set }
    }

    /// 交集，返回新集合
    pub fn intersect<'a, I: IntoIterator<Item = &'a T>>(&self, other: I) -> Self
    where
        T: 'a,
    {
        let other: HashSet<&T> = other.into_iter().collect();
        let set = self
            .set
            .iter()
            .filter(|v| other.contains(*v))
            .cloned()
            .collect();
        Self { set }
    }

    /// 差集，返回新集合
    pub fn except<'a, I: IntoIterator<Item = &'a T>>(&self, other: I) -> Self
    where
        T: 'a,
    {
        let mut set = self.set.clone();
        for value in other {
            set.remove(value);
        }
        Self { set }
    }

    /// 对称差，返回新集合
    pub fn symmetric_except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut set = self.set.clone();
        for value in other {
            if !set.remove(&value) {
                set.insert(value);
            }
        }
        Self { set }
    }

    /// 成员测试
    pub fn contains(&self, value: &T) -> bool {
        self.set.contains(value)
    }

    /// 规范值查找
    ///
    /// 返回与探测值结构相等的已存储实例；下游缓存按实例身份
    /// 建键时需要取回规范实例而非探测值本身
    pub fn get(&self, value: &T) -> Option<&T> {
        self.set.get(value)
    }

    /// 子集测试
    pub fn is_subset(&self, other: &Self) -> bool {
        self.set.is_subset(&other.set)
    }

    /// 超集测试
    pub fn is_superset(&self, other: &Self) -> bool {
        self.set.is_superset(&other.set)
    }

    /// 真子集测试
    pub fn is_proper_subset(&self, other: &Self) -> bool {
        self.set.len() < other.set.len() && self.set.is_subset(&other.set)
    }

    /// 真超集测试
    pub fn is_proper_superset(&self, other: &Self) -> bool {
        self.set.len() > other.set.len() && self.set.is_superset(&other.set)
    }

    /// 是否存在公共元素
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.set.is_disjoint(&other.set)
    }

    /// 集合相等性测试
    pub fn set_equals(&self, other: &Self) -> bool {
        self.set == other.set
    }

    /// 迭代元素
    pub fn iter(&self) -> hash_set::Iter<'_, T> {
        self.set.iter()
    }
}

impl<T: Eq + Hash + Clone> PartialEq for NonSharingHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set
    }
}

impl<T: Eq + Hash + Clone> Eq for NonSharingHashSet<T> {}

impl<T: Eq + Hash + Clone> From<HashSet<T>> for NonSharingHashSet<T> {
    fn from(set: HashSet<T>) -> Self {
        Self { set }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for NonSharingHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            set: iter.into_iter().collect(),
        }
    }
}

impl<T: Eq + Hash + Clone> IntoIterator for NonSharingHashSet<T> {
    type Item = T;
    type IntoIter = hash_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.into_iter()
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a NonSharingHashSet<T> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_never_touches_the_receiver() {
        let a: NonSharingHashSet<i32> = [1, 2, 3].into_iter().collect();
        let b = a.insert(4);
        let c = a.remove(&1);

        assert_eq!(a.len(), 3);
        assert!(a.contains(&1));
        assert!(b.contains(&4));
        assert!(!c.contains(&1));
    }

    #[test]
    fn algebraic_operations() {
        let a: NonSharingHashSet<i32> = [1, 2, 3].into_iter().collect();
        let b: NonSharingHashSet<i32> = [3, 4].into_iter().collect();

        assert_eq!(a.union(b.iter().cloned()).len(), 4);
        assert_eq!(a.intersect(b.iter()).len(), 1);
        assert_eq!(a.except(b.iter()).len(), 2);
        assert_eq!(a.symmetric_except(b.iter().cloned()).len(), 3);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn subset_and_superset() {
        let small: NonSharingHashSet<i32> = [1, 2].into_iter().collect();
        let big: NonSharingHashSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(small.is_subset(&big));
        assert!(small.is_proper_subset(&big));
        assert!(big.is_superset(&small));
        assert!(big.is_proper_superset(&small));
        assert!(!big.is_proper_superset(&big));
        assert!(big.set_equals(&big.clone()));
    }

    #[test]
    fn canonical_lookup_returns_stored_instance() {
        let stored = String::from("contract");
        let set: NonSharingHashSet<String> = [stored].into_iter().collect();
        let lookup = String::from("contract");
        let canonical = set.get(&lookup).unwrap();
        assert_eq!(canonical, &lookup);
        assert_ne!(canonical.as_ptr(), lookup.as_ptr());
    }
}
