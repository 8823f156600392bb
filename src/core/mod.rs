//! Usage resolution and container allocation
//!
//! - [`resolver`] - walks a level and its models to build the usage set
//! - [`usage`] - usage set and model references
//! - [`names`] - stem / base identifier / low-detail naming rules
//! - [`container`] - binder contents with dense ids
//! - [`pool`] - fixed set of peer containers
//! - [`allocator`] - pruning and lookup
//! - [`balance`] - pairwise byte leveling
//! - [`planner`] - adjacency-preserving placement

pub mod allocator;
pub mod balance;
pub mod container;
pub mod names;
pub mod planner;
pub mod pool;
pub mod resolver;
pub mod usage;
