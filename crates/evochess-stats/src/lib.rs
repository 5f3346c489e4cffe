//! Summary statistics for evolution runs.
//!
//! The training loop reports how fitness and each gene are distributed across
//! a population. [`descriptive::DescriptiveStats`] condenses such a sample
//! into its extremes, center and spread.
//!
//! # Example
//!
//! ```
//! use evochess_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [9.0, 3.0, 6.0, 1.0];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.max, 9.0);
//! assert_eq!(stats.mean, 4.75);
//! assert_eq!(stats.median, 4.5);
//! ```

pub mod descriptive;
