//! Default-method collision avoidance for interface merging.

use std::collections::{HashMap, HashSet};

use crate::{
    graph::{ProgramGraph, TypeRef},
    merging::{MergeGroup, MultiClassPolicyWithPreprocessing},
};

/// Name and prototype of a method, ignoring the holder. Two default methods
/// collide exactly when these agree.
type DispatchSignature = (String, Vec<TypeRef>);

/// Splits interface groups so no two merged interfaces declare default
/// methods with the same name and prototype.
///
/// Merging two such interfaces would leave the target with two bodies for
/// one dispatch slot. The per-interface signature sets are computed once
/// over the whole program, then groups are repartitioned greedily: each
/// interface joins the first bucket whose accumulated signatures are
/// disjoint from its own. Class groups pass through untouched — default
/// methods are an interface concern.
#[derive(Debug, Default)]
pub struct NoDefaultMethodCollisions;

impl MultiClassPolicyWithPreprocessing for NoDefaultMethodCollisions {
    type Data = HashMap<TypeRef, HashSet<DispatchSignature>>;

    fn name(&self) -> &'static str {
        "NoDefaultMethodCollisions"
    }

    fn preprocess(&self, graph: &ProgramGraph) -> Self::Data {
        graph
            .classes()
            .iter()
            .filter(|class| class.is_interface())
            .map(|class| {
                let signatures = class
                    .default_methods()
                    .map(|method| {
                        (
                            method.reference().name().to_string(),
                            method.reference().parameters().to_vec(),
                        )
                    })
                    .collect();
                (class.reference().clone(), signatures)
            })
            .collect()
    }

    fn apply(&self, group: MergeGroup, data: &Self::Data, _graph: &ProgramGraph) -> Vec<MergeGroup> {
        if !group.is_interface_group() {
            return vec![group];
        }

        let mut buckets: Vec<(MergeGroup, HashSet<DispatchSignature>)> = Vec::new();
        for interface in group {
            let empty = HashSet::new();
            let signatures = data.get(&interface).unwrap_or(&empty);
            let bucket = buckets
                .iter_mut()
                .find(|(_, taken)| taken.is_disjoint(signatures));
            match bucket {
                Some((bucket_group, taken)) => {
                    bucket_group.add(interface);
                    taken.extend(signatures.iter().cloned());
                }
                None => {
                    let mut bucket_group = MergeGroup::new_interface_group();
                    bucket_group.add(interface);
                    buckets.push((bucket_group, signatures.clone()));
                }
            }
        }
        buckets.into_iter().map(|(bucket_group, _)| bucket_group).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        ClassFlags, MemberFlags, MethodDefinition, MethodRef, ProgramClass, ProgramGraph,
    };

    fn interface_with_default(name: &str, method_name: &str) -> ProgramClass {
        let reference = TypeRef::class(name);
        let method = MethodRef::new(
            reference.clone(),
            method_name,
            TypeRef::from_descriptor("V").unwrap(),
            Vec::new(),
        );
        ProgramClass::builder(reference)
            .flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT)
            .method(MethodDefinition::new(method, MemberFlags::PUBLIC))
            .build()
    }

    #[test]
    fn colliding_defaults_are_separated() {
        let mut graph = ProgramGraph::new();
        graph.add_class(interface_with_default("I", "run")).unwrap();
        graph.add_class(interface_with_default("J", "run")).unwrap();
        graph.add_class(interface_with_default("K", "walk")).unwrap();

        let policy = NoDefaultMethodCollisions;
        let data = policy.preprocess(&graph);
        let group = MergeGroup::from_interfaces([
            TypeRef::class("I"),
            TypeRef::class("J"),
            TypeRef::class("K"),
        ]);
        let groups = policy.apply(group, &data, &graph);

        // I and J both declare a default `run`; K slots in with I.
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].iter().collect::<Vec<_>>(),
            vec![&TypeRef::class("I"), &TypeRef::class("K")]
        );
        assert_eq!(groups[1].iter().collect::<Vec<_>>(), vec![&TypeRef::class("J")]);
        assert!(groups.iter().all(MergeGroup::is_interface_group));
    }

    #[test]
    fn class_groups_pass_through() {
        let graph = ProgramGraph::new();
        let policy = NoDefaultMethodCollisions;
        let data = policy.preprocess(&graph);
        let group = MergeGroup::from_classes([TypeRef::class("A"), TypeRef::class("B")]);
        let groups = policy.apply(group.clone(), &data, &graph);
        assert_eq!(groups, vec![group]);
    }
}
