//! Merge groups.
//!
//! A merge group is an ordered set of classes slated to merge into one. The
//! first element is the merge target; every later element is a source that
//! will be folded into it and removed from the program.

use std::collections::VecDeque;

use crate::graph::TypeRef;

/// An ordered group of classes to merge, target first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    classes: VecDeque<TypeRef>,
    interface_group: bool,
}

impl MergeGroup {
    /// Creates an empty group of ordinary classes.
    pub fn new() -> Self {
        Self {
            classes: VecDeque::new(),
            interface_group: false,
        }
    }

    /// Creates an empty group of interfaces.
    pub fn new_interface_group() -> Self {
        Self {
            classes: VecDeque::new(),
            interface_group: true,
        }
    }

    /// Creates a class group from members in order, target first.
    pub fn from_classes<I: IntoIterator<Item = TypeRef>>(classes: I) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            interface_group: false,
        }
    }

    /// Creates an interface group from members in order, target first.
    pub fn from_interfaces<I: IntoIterator<Item = TypeRef>>(interfaces: I) -> Self {
        Self {
            classes: interfaces.into_iter().collect(),
            interface_group: true,
        }
    }

    /// Whether the group holds interfaces rather than classes.
    pub fn is_interface_group(&self) -> bool {
        self.interface_group
    }

    /// Appends a class to the group.
    pub fn add(&mut self, class: TypeRef) {
        self.classes.push_back(class);
    }

    /// Number of classes in the group.
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// Whether the group holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// A group of fewer than two classes merges nothing.
    pub fn is_trivial(&self) -> bool {
        self.size() < 2
    }

    /// Whether the group still describes an actual merge.
    pub fn is_non_trivial(&self) -> bool {
        !self.is_trivial()
    }

    /// The merge target: the first class of the group.
    pub fn target(&self) -> Option<&TypeRef> {
        self.classes.front()
    }

    /// The merge sources: every class after the target.
    pub fn sources(&self) -> impl Iterator<Item = &TypeRef> {
        self.classes.iter().skip(1)
    }

    /// All classes in order, target first.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.classes.iter()
    }

    /// Removes and returns the last class of the group.
    pub fn remove_last(&mut self) -> Option<TypeRef> {
        self.classes.pop_back()
    }

    /// Removes and returns the first class of the group.
    pub fn remove_first(&mut self) -> Option<TypeRef> {
        self.classes.pop_front()
    }
}

impl Default for MergeGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for MergeGroup {
    type Item = TypeRef;
    type IntoIter = std::collections::vec_deque::IntoIter<TypeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_the_first_class() {
        let a = TypeRef::class("A");
        let b = TypeRef::class("B");
        let group = MergeGroup::from_classes([a.clone(), b.clone()]);

        assert_eq!(group.target(), Some(&a));
        assert_eq!(group.sources().collect::<Vec<_>>(), vec![&b]);
        assert!(group.is_non_trivial());
    }

    #[test]
    fn singleton_and_empty_groups_are_trivial() {
        assert!(MergeGroup::new().is_trivial());
        assert!(MergeGroup::from_classes([TypeRef::class("A")]).is_trivial());
    }
}
