//! Category Scoring System
//!
//! This module turns a flat diagnostic list into the per-category and
//! overall workspace scores.
//!
//! # Scoring Formula
//!
//! ```text
//! Category Score = max(0, 100 - Σ penalty(severity))   (per diagnostic)
//! Overall Score  = round(Σ CategoryScore × CategoryWeight)
//!
//! Default penalties:  error 25, warning 10, info 3
//! Weights:            structure .12  clarity .20  completeness .12
//!                     security .15   consistency .08  memory .10
//!                     runtime .13    skillSafety .10
//! ```
//!
//! # Example
//!
//! A workspace with two clarity warnings and one security error:
//! - Clarity  = 100 - 2 × 10 = 80
//! - Security = 100 - 25     = 75
//! - Overall  = 80 × .20 + 75 × .15 + 100 × .65 = 92.25 → 92

mod category_scorer;

pub use category_scorer::CategoryScorer;
