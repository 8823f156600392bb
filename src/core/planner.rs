//! Placement of incoming entries into containers
//!
//! A texture and its low-detail variant always end up next to each other,
//! detail first. An entry whose counterpart is already placed goes beside it;
//! anything else is appended to the lightest container.

use crate::core::container::{Container, Entry};
use crate::core::pool::ContainerPool;

/// Where an incoming entry ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inserted beside its already-placed counterpart
    Adjacent { container: usize, index: usize },

    /// Appended to the lightest container
    Appended { container: usize, index: usize },

    /// Overwrote an entry with the same stem in place
    Replaced { container: usize, index: usize },

    /// An entry with the same stem already exists; nothing was copied
    AlreadyPresent,

    /// The pool has no containers to receive the entry
    Rejected,
}

impl Placement {
    /// True when the entry was copied into a container
    pub fn is_placed(&self) -> bool {
        !matches!(self, Placement::AlreadyPresent | Placement::Rejected)
    }
}

/// Chooses the receiving container and index for incoming entries
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferPlanner;

impl TransferPlanner {
    pub fn new() -> Self {
        TransferPlanner
    }

    /// Place an entry unless one with the same stem is already in the pool
    ///
    /// Entries copied in an earlier phase are never displaced by this call.
    pub fn place(&self, entry: Entry, pool: &mut ContainerPool) -> Placement {
        if pool.find_stem(entry.stem()).is_some() {
            return Placement::AlreadyPresent;
        }
        self.place_new(entry, pool)
    }

    /// Place an entry, overwriting a same-stem entry in place if one exists
    pub fn upsert(&self, entry: Entry, pool: &mut ContainerPool) -> Placement {
        if let Some((container, index)) = pool.find_stem(entry.stem()) {
            if let Some(target) = pool.get_mut(container) {
                target.replace(index, entry);
                return Placement::Replaced { container, index };
            }
        }
        self.place_new(entry, pool)
    }

    /// Single-container variant: same adjacency rule, duplicates are overwritten
    pub fn place_single(&self, entry: Entry, container: &mut Container) -> Placement {
        if let Some(index) = container.position_of_stem(entry.stem()) {
            container.replace(index, entry);
            return Placement::Replaced {
                container: 0,
                index,
            };
        }

        match container.position_of_stem(&entry.counterpart_stem()) {
            Some(found) => {
                let index = container.insert(adjacent_index(&entry, found), entry);
                Placement::Adjacent {
                    container: 0,
                    index,
                }
            }
            None => {
                let index = container.push(entry);
                Placement::Appended {
                    container: 0,
                    index,
                }
            }
        }
    }

    fn place_new(&self, entry: Entry, pool: &mut ContainerPool) -> Placement {
        if let Some((container, found)) = pool.find_stem(&entry.counterpart_stem()) {
            if let Some(target) = pool.get_mut(container) {
                let index = target.insert(adjacent_index(&entry, found), entry);
                return Placement::Adjacent { container, index };
            }
        }

        let Some(container) = pool.smallest_index() else {
            return Placement::Rejected;
        };
        match pool.get_mut(container) {
            Some(target) => {
                let index = target.push(entry);
                Placement::Appended { container, index }
            }
            None => Placement::Rejected,
        }
    }
}

/// Index that puts `entry` beside a counterpart found at `found`
///
/// A low-detail entry goes right after its detail texture; a detail texture
/// takes the slot of its low-detail entry, pushing it one step back.
fn adjacent_index(entry: &Entry, found: usize) -> usize {
    if entry.is_low_detail() {
        found + 1
    } else {
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, len: usize) -> Entry {
        Entry::new(name, vec![0u8; len], 0)
    }

    fn names(c: &Container) -> Vec<&str> {
        c.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_pair_lands_together_in_first_container() {
        let mut pool = ContainerPool::new(4);
        let planner = TransferPlanner::new();

        assert_eq!(
            planner.place(entry("A.tpf.dcx", 10), &mut pool),
            Placement::Appended {
                container: 0,
                index: 0
            }
        );
        assert_eq!(
            planner.place(entry("A_l.tpf.dcx", 2), &mut pool),
            Placement::Adjacent {
                container: 0,
                index: 1
            }
        );

        let c0 = pool.get(0).unwrap();
        assert_eq!(names(c0), vec!["A.tpf.dcx", "A_l.tpf.dcx"]);
        assert_eq!(c0.get(0).unwrap().id, 0);
        assert_eq!(c0.get(1).unwrap().id, 1);
    }

    #[test]
    fn test_detail_inserted_before_existing_low_detail() {
        let mut pool = ContainerPool::new(2);
        pool.get_mut(1).unwrap().push(entry("x.tpf.dcx", 1));
        pool.get_mut(1).unwrap().push(entry("A_l.tpf.dcx", 1));
        pool.get_mut(1).unwrap().push(entry("y.tpf.dcx", 1));

        let placement = TransferPlanner::new().place(entry("A.tpf.dcx", 5), &mut pool);

        assert_eq!(
            placement,
            Placement::Adjacent {
                container: 1,
                index: 1
            }
        );
        let c1 = pool.get(1).unwrap();
        assert_eq!(names(c1), vec!["x.tpf.dcx", "A.tpf.dcx", "A_l.tpf.dcx", "y.tpf.dcx"]);
        assert!(c1.ids_are_dense());
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut pool = ContainerPool::new(2);
        let planner = TransferPlanner::new();
        planner.place(entry("A.tpf.dcx", 5), &mut pool);

        let placement = planner.place(entry("A.tpf.dcx", 99), &mut pool);

        assert_eq!(placement, Placement::AlreadyPresent);
        assert!(!placement.is_placed());
        assert_eq!(pool.total_size(), 5);
    }

    #[test]
    fn test_appends_to_smallest_container() {
        let mut pool = ContainerPool::new(3);
        pool.get_mut(0).unwrap().push(entry("a.tpf.dcx", 50));
        pool.get_mut(1).unwrap().push(entry("b.tpf.dcx", 10));
        pool.get_mut(2).unwrap().push(entry("c.tpf.dcx", 30));

        let placement = TransferPlanner::new().place(entry("d.tpf.dcx", 1), &mut pool);
        assert_eq!(
            placement,
            Placement::Appended {
                container: 1,
                index: 1
            }
        );
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut pool = ContainerPool::new(2);
        pool.get_mut(1).unwrap().push(entry("A.tpf.dcx", 5));
        pool.get_mut(1).unwrap().push(entry("A_l.tpf.dcx", 1));

        let placement = TransferPlanner::new().upsert(entry("A.tpf.dcx", 40), &mut pool);

        assert_eq!(
            placement,
            Placement::Replaced {
                container: 1,
                index: 0
            }
        );
        assert_eq!(pool.get(1).unwrap().size(), 41);
        assert_eq!(pool.entry_count(), 2);
    }

    #[test]
    fn test_single_container_overwrites_and_pairs() {
        let mut env = Container::new();
        let planner = TransferPlanner::new();

        planner.place_single(entry("gi_a_l.tpf.dcx", 3), &mut env);
        planner.place_single(entry("other.tpf.dcx", 3), &mut env);
        planner.place_single(entry("gi_a.tpf.dcx", 7), &mut env);
        let replaced = planner.place_single(entry("other.tpf.dcx", 9), &mut env);

        assert_eq!(
            replaced,
            Placement::Replaced {
                container: 0,
                index: 2
            }
        );
        assert_eq!(names(&env), vec!["gi_a.tpf.dcx", "gi_a_l.tpf.dcx", "other.tpf.dcx"]);
        assert_eq!(env.size(), 19);
        assert!(env.ids_are_dense());
    }

    #[test]
    fn test_empty_pool_rejects() {
        let mut pool = ContainerPool::new(0);
        let placement = TransferPlanner::new().place(entry("a.tpf.dcx", 1), &mut pool);
        assert_eq!(placement, Placement::Rejected);
    }
}
