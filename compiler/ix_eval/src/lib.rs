//! Reference host runtime for generated introspection artifacts.
//!
//! This crate provides:
//!
//! - **Values and hosts** ([`Value`], [`Host`], [`ConventionHost`]): the
//!   object model generated code calls into.
//!
//! - **Interpreter** ([`Interpreter`]): executes an artifact's entry points
//!   with checked casts and explicit raised errors.
//!
//! - **Introspection** ([`Introspection`], [`Builder`]): the runtime
//!   contract (instantiate, get, set, withers, method invocation and
//!   annotation lookups) answered by running the generated code.
//!
//! # Crate Dependencies
//!
//! Depends only on `ix_ir`. It never generates code, so running an artifact
//! needs no access to the generator.

mod builder;
mod error;
mod host;
mod interpreter;
mod introspection;
mod value;

pub use builder::Builder;
pub use error::EvalError;
pub use host::{BoundMethod, ConventionHost, Host};
pub use interpreter::{Frame, Interpreter};
pub use introspection::Introspection;
pub use value::{Object, ObjectRef, Value};
