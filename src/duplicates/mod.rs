//! Content classification module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Full-content hashing of same-size files (Phase 2)
//! - Content class aggregation and occurrence counts

pub mod classifier;
pub mod groups;

pub use classifier::{
    aggregate, hash_phase, Classification, ClassifiedFile, Classifier, ClassifierConfig,
    ClassifyError, ClassifySummary, ClassifyWarning, HashStats,
};
pub use groups::{group_by_size, partition_by_ambiguity, GroupingStats, HashGroup, SizeGroup};
