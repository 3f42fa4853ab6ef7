//! Dental domain knowledge: mesh classification and the clinical chart.
//!
//! Both modules are pure and engine independent. Mesh names exported by the
//! model are inconsistent across quadrants, so every function here is total:
//! unknown names degrade to a tooth classification or to the sentinel record
//! instead of failing at interaction time.

/// Skull/tooth classification, registry key normalisation and arch detection.
pub mod classifier;

/// Static clinical records keyed by normalised tooth identifier.
pub mod registry;
