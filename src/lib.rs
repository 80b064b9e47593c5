//! # refract
//!
//! Reference-rewriting core for whole-program bytecode optimization.
//!
//! A shrinking compilation runs a sequence of whole-program passes — access
//! widening, repackaging, member rebinding, class merging — each of which
//! changes what program references mean. `refract` keeps that meaning
//! trackable: every pass publishes an immutable [`lens::GraphLens`]
//! describing its rewrites, the lenses compose into a [`lens::LensChain`],
//! and any reference from any earlier stage resolves through the chain to
//! its current identity (or back to its original one).
//!
//! The crate also houses the policy-driven class-merging engine that feeds
//! the merger lens: candidate groups of classes are refined by an ordered
//! list of pluggable [`merging::Policy`] rules until only legal merges
//! remain.
//!
//! # Architecture
//!
//! - [`graph`] — reference identities ([`graph::TypeRef`],
//!   [`graph::FieldRef`], [`graph::MethodRef`]), the closed
//!   [`graph::ProgramGraph`], and the parallel referenced-members sweep
//! - [`lens`] — the four specialized lenses and the [`lens::LensChain`]
//!   composing them
//! - [`merging`] — merge groups, policies, the executor, and the committed
//!   [`merging::MergedClasses`] registry
//! - [`collections`] — the bidirectional maps the lenses are built from
//!
//! # Usage Examples
//!
//! ```rust
//! use refract::graph::TypeRef;
//! use refract::lens::{ClassMergerLens, LensChain};
//!
//! let source = TypeRef::class("com.app.Impl");
//! let target = TypeRef::class("com.app.Api");
//!
//! let builder = ClassMergerLens::builder();
//! builder.record_type_merge([source.clone()], target.clone(), false);
//!
//! let mut chain = LensChain::identity();
//! chain.push(builder.build());
//!
//! assert_eq!(chain.lookup_type(&source), target);
//! assert_eq!(chain.lookup_type(&source.array_of()), target.array_of());
//! ```
//!
//! # Thread Safety
//!
//! Lens builders accept concurrent recording; built lenses, chains and the
//! merged-classes registry are immutable and freely shared across threads.

#![warn(missing_docs)]

#[macro_use]
pub(crate) mod error;

pub mod collections;
pub mod graph;
pub mod lens;
pub mod merging;
pub mod prelude;

pub use error::Error;

/// Convenience alias for operations that can fail with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
