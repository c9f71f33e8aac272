//! Beaconing detection core: the per-pair statistical scoring engine.
//!
//! Given a pair's connection history (timestamps and origin byte
//! counts) and the run's observation window, [`scorer::score_pair`]
//! computes a composite beacon score in `[0, 1]` together with the
//! diagnostic sub-statistics that explain it. Everything in this
//! crate is a pure function over owned data: no I/O, no async, no
//! shared mutable state. The concurrency, configuration, and wire
//! format that run this kernel against a real connection-log stream
//! live in `beacon-daemon`.

pub mod numeric;
pub mod scorer;
pub mod stats;
pub mod types;

pub use scorer::{score_pair, Config};
pub use types::{BeaconOutput, GlobalWindow, PairInput, SizeStats, TimestampStats};
