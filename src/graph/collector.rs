//! Whole-program referenced-members sweep.
//!
//! Walks every method body edge in the program graph and reports each
//! distinct member reference exactly once. Member rebinding seeds its lens
//! from this sweep: every reference the program makes is resolved to the
//! class that actually declares the member.
//!
//! # Thread Safety
//!
//! Classes are swept in parallel. Deduplication goes through shared
//! concurrent sets, so consumers must be `Send + Sync`; a consumer is invoked
//! at most once per distinct reference but from arbitrary worker threads.

use dashmap::DashSet;
use rayon::prelude::*;

use crate::graph::{FieldRef, MethodRef, ProgramGraph};

/// Callback interface for the referenced-members sweep.
///
/// `context` is the method whose body makes the reference.
pub trait ReferencedMembersConsumer: Send + Sync {
    /// Invoked once per distinct field reference in the program.
    fn on_field_reference(&self, field: &FieldRef, context: &MethodRef);

    /// Invoked once per distinct method reference in the program.
    fn on_method_reference(&self, method: &MethodRef, context: &MethodRef);
}

/// Sweeps the program graph for member references, deduplicated.
pub struct ReferencedMembersCollector<'a, C> {
    graph: &'a ProgramGraph,
    consumer: C,
}

impl<'a, C: ReferencedMembersConsumer> ReferencedMembersCollector<'a, C> {
    /// Creates a collector over `graph` reporting into `consumer`.
    pub fn new(graph: &'a ProgramGraph, consumer: C) -> Self {
        Self { graph, consumer }
    }

    /// Runs the sweep across all classes in parallel.
    pub fn run(&self) {
        let seen_fields: DashSet<FieldRef> = DashSet::new();
        let seen_methods: DashSet<MethodRef> = DashSet::new();

        self.graph.classes().par_iter().for_each(|class| {
            for method in class.methods() {
                let context = method.reference();
                for field in method.referenced_fields() {
                    if seen_fields.insert(field.clone()) {
                        self.consumer.on_field_reference(field, context);
                    }
                }
                for callee in method.referenced_methods() {
                    if seen_methods.insert(callee.clone()) {
                        self.consumer.on_method_reference(callee, context);
                    }
                }
            }
        });
    }
}
