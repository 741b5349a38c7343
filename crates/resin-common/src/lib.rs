//! Foundational types for the resin shape-inference engine.
//!
//! This crate provides the types every other resin crate builds on:
//! - The shape IR (`Shape`, `Field`, `Primitive`, `EnumShape`): the
//!   immutable output of inference, consumed by renderers and aggregators
//! - Centralized limits and thresholds (`limits`)

// Shape IR - the inferred structural type tree
pub mod shape;
pub use shape::{EnumBacking, EnumShape, EnumValue, Field, Primitive, Shape, unify_returns};

// Centralized limits and thresholds
pub mod limits;
