//! Lens chain behavior across composed transformation stages.

use std::collections::HashMap;
use std::thread;

use refract::graph::{
    ClassFlags, InvokeKind, MemberFlags, MethodDefinition, MethodRef, ProgramClass, ProgramGraph,
    TypeRef,
};
use refract::lens::{
    AccessModifierLens, ClassMergerLens, LensChain, MemberRebindingLens, RepackagingLens,
};

fn void() -> TypeRef {
    TypeRef::from_descriptor("V").unwrap()
}

fn method(holder: &TypeRef, name: &str) -> MethodRef {
    MethodRef::new(holder.clone(), name, void(), Vec::new())
}

#[test]
fn forward_lookup_then_reverse_walk_recovers_the_original() {
    let original_type = TypeRef::class("com.app.Widget");
    let repackaged_type = original_type.with_package("a");
    let merge_target = TypeRef::class("a.Panel");

    let mut chain = LensChain::identity();

    let repackaging = RepackagingLens::builder();
    repackaging.record_type_move(original_type.clone(), repackaged_type.clone());
    let original_method = method(&original_type, "draw");
    let repackaged_method = method(&repackaged_type, "draw");
    repackaging.record_method_move(original_method.clone(), repackaged_method.clone());
    chain.push(repackaging.build(HashMap::from([("com/app".to_string(), "a".to_string())])));

    let merging = ClassMergerLens::builder();
    merging.record_type_merge([repackaged_type.clone()], merge_target.clone(), false);
    let merged_method = method(&merge_target, "draw");
    merging.record_method_move(repackaged_method.clone(), merged_method.clone());
    chain.push(merging.build());

    assert_eq!(chain.lookup_type(&original_type), merge_target);
    assert_eq!(chain.next_method_signature(&original_method), merged_method);
    assert_eq!(chain.previous_method_signature(&merged_method), original_method);
    assert_eq!(
        chain.lookup_type(&original_type.array_of()),
        merge_target.array_of()
    );
}

#[test]
fn unmapped_references_resolve_to_themselves_at_any_depth() {
    let untouched_type = TypeRef::class("x.Untouched");
    let untouched_method = method(&untouched_type, "m");
    let primitive = TypeRef::from_descriptor("J").unwrap();

    let mut chain = LensChain::identity();
    for depth in 0..3 {
        assert_eq!(chain.len(), depth);
        assert_eq!(chain.lookup_type(&untouched_type), untouched_type);
        assert_eq!(chain.lookup_type(&primitive), primitive);

        let result = chain.lookup_method(&untouched_method, InvokeKind::Static);
        assert_eq!(result.reference, untouched_method);
        assert_eq!(result.rebound_reference, untouched_method);
        assert_eq!(result.invoke_kind, InvokeKind::Static);
        assert_eq!(
            chain.previous_method_signature(&untouched_method),
            untouched_method
        );

        let builder = ClassMergerLens::builder();
        builder.record_type_merge(
            [TypeRef::class(&format!("gen.Source{depth}"))],
            TypeRef::class(&format!("gen.Target{depth}")),
            false,
        );
        chain.push(builder.build());
    }
}

#[test]
fn invoke_kind_follows_the_holder_through_the_chain() {
    // A program where Derived.m is actually declared on the interface Base,
    // Base.m is then publicized from private, and Base is finally merged
    // into the class Impl.
    let base = TypeRef::class("Base");
    let derived = TypeRef::class("Derived");
    let impl_class = TypeRef::class("Impl");

    let declared = method(&base, "m");
    let referenced = method(&derived, "m");
    let caller = method(&derived, "caller");

    let mut graph = ProgramGraph::new();
    let base_class = ProgramClass::builder(base.clone())
        .flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT)
        .method(MethodDefinition::new(declared.clone(), MemberFlags::PRIVATE))
        .build();
    graph.add_class(base_class.clone()).unwrap();
    graph
        .add_class(
            ProgramClass::builder(derived.clone())
                .implements(base.clone())
                .method(
                    MethodDefinition::new(caller, MemberFlags::PUBLIC)
                        .with_method_references(vec![referenced.clone()]),
                )
                .build(),
        )
        .unwrap();
    graph
        .add_class(ProgramClass::builder(impl_class.clone()).build())
        .unwrap();

    let mut chain = LensChain::identity();
    chain.push(MemberRebindingLens::create(&graph));

    let access = AccessModifierLens::builder();
    access.add_publicized_private_virtual_method(&base_class, declared.clone());
    chain.push(access.build());

    let merging = ClassMergerLens::builder();
    merging.record_type_merge([base.clone()], impl_class.clone(), false);
    merging.record_method_move(declared.clone(), method(&impl_class, "m"));
    chain.push(merging.build());

    let result = chain.lookup_method(&referenced, InvokeKind::Direct);
    // Rebinding finds the declaration on Base, publicizing makes the direct
    // invoke an interface invoke, and merging Base into the class Impl
    // finally turns it virtual.
    assert_eq!(result.rebound_reference, method(&impl_class, "m"));
    assert_eq!(result.invoke_kind, InvokeKind::Virtual);
}

#[test]
fn simple_renaming_is_attributed_to_repackaging_only() {
    let from = TypeRef::class("com.app.Widget");
    let to = from.with_package("a");

    let mut chain = LensChain::identity();
    let repackaging = RepackagingLens::builder();
    repackaging.record_type_move(from.clone(), to.clone());
    chain.push(repackaging.build(HashMap::new()));

    assert!(chain.is_simple_renaming(&from.clone().into(), &to.clone().into()));
    assert!(!chain.is_simple_renaming(&from.into(), &TypeRef::class("x.Other").into()));
}

#[test]
#[should_panic]
fn an_access_lens_with_nothing_recorded_cannot_be_built() {
    let _ = AccessModifierLens::builder().build();
}

#[test]
#[should_panic]
fn a_repackaging_lens_without_type_moves_cannot_be_built() {
    let _ = RepackagingLens::builder().build(HashMap::new());
}

#[test]
fn builders_accept_concurrent_recording() {
    let builder = RepackagingLens::builder();

    thread::scope(|scope| {
        for worker in 0..8 {
            let builder = &builder;
            scope.spawn(move || {
                for index in 0..50 {
                    let from = TypeRef::class(&format!("w{worker}.C{index}"));
                    let to = from.with_package(&format!("out{worker}"));
                    builder.record_type_move(from.clone(), to.clone());
                    builder.record_method_move(
                        method(&from, "m"),
                        method(&to, "m"),
                    );
                }
            });
        }
    });

    let lens = builder.build(HashMap::new());
    for worker in 0..8 {
        for index in 0..50 {
            let from = TypeRef::class(&format!("w{worker}.C{index}"));
            let to = from.with_package(&format!("out{worker}"));
            assert_eq!(lens.next_class_type(&from), to);
            assert_eq!(lens.previous_class_type(&to), from);
            assert_eq!(lens.next_method_signature(&method(&from, "m")), method(&to, "m"));
        }
    }
}
