//! Centralized limits and thresholds for the inference engine.
//!
//! Centralizing these values prevents duplicate definitions with
//! inconsistent numbers and keeps guard construction sites free of magic
//! constants.

/// Maximum depth for cross-method resolution.
///
/// Each nested receiver invocation (`this.a()` calling `this.b()` calling
/// `this.c()`...) adds one level. Real transform methods rarely nest past
/// four or five; 32 leaves generous headroom while keeping a pathological
/// generated input from deepening the call stack unboundedly. Cycle
/// detection fires before this in any recursive chain; the depth limit
/// catches long non-cyclic chains.
pub const MAX_METHOD_RESOLUTION_DEPTH: u32 = 32;

/// Maximum total method-resolution attempts per top-level inference call.
///
/// A work budget across the whole walk rather than per branch. Bounded by
/// the number of distinct methods in practice; the budget only matters for
/// degenerate inputs with thousands of generated methods.
pub const MAX_RESOLUTION_ITERATIONS: u32 = 10_000;

/// Maximum scalar columns included in a relationship's minimal projection,
/// beyond the identifier.
pub const MINIMAL_PROJECTION_FIELDS: usize = 3;
