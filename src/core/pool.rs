//! Fixed-size pool of peer containers

use crate::core::container::Container;

/// Default number of peer containers per level (`m{MM}_0000` .. `m{MM}_0003`)
pub const DEFAULT_PEER_COUNT: usize = 4;

/// Ordered list of peer containers sharing one level's texture load
///
/// The pool never grows or shrinks after construction. Lookups are flat
/// scans; a level has a handful of containers with a few hundred entries each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPool {
    containers: Vec<Container>,
}

impl ContainerPool {
    /// Create a pool of `count` empty containers
    pub fn new(count: usize) -> Self {
        ContainerPool {
            containers: (0..count).map(|_| Container::new()).collect(),
        }
    }

    pub fn from_containers(containers: Vec<Container>) -> Self {
        ContainerPool { containers }
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn get(&self, index: usize) -> Option<&Container> {
        self.containers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Container> {
        self.containers.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.containers.iter_mut()
    }

    /// Byte size of every container, in pool order
    pub fn sizes(&self) -> Vec<u64> {
        self.containers.iter().map(Container::size).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.containers.iter().map(Container::size).sum()
    }

    pub fn entry_count(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }

    /// Index of the lightest container; ties go to the lowest index
    pub fn smallest_index(&self) -> Option<usize> {
        self.containers
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.size(), *i))
            .map(|(i, _)| i)
    }

    /// Find the entry with exactly this stem: `(container index, entry index)`
    pub fn find_stem(&self, stem: &str) -> Option<(usize, usize)> {
        self.containers
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.position_of_stem(stem).map(|ei| (ci, ei)))
    }

    /// Mutable access to two distinct containers at once
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Container, &mut Container)> {
        if a == b || a >= self.containers.len() || b >= self.containers.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.containers.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.containers.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }
}

impl Default for ContainerPool {
    fn default() -> Self {
        Self::new(DEFAULT_PEER_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::container::Entry;

    #[test]
    fn test_smallest_index_ties_to_first() {
        let pool = ContainerPool::new(4);
        assert_eq!(pool.smallest_index(), Some(0));

        let mut pool = ContainerPool::new(3);
        pool.get_mut(0).unwrap().push(Entry::new("a.tpf.dcx", vec![0; 10], 0));
        pool.get_mut(2).unwrap().push(Entry::new("b.tpf.dcx", vec![0; 2], 0));
        assert_eq!(pool.smallest_index(), Some(1));
    }

    #[test]
    fn test_find_stem_scans_in_pool_order() {
        let mut pool = ContainerPool::new(2);
        pool.get_mut(1).unwrap().push(Entry::new("x.tpf.dcx", vec![1], 0));
        pool.get_mut(1).unwrap().push(Entry::new("y_l.tpf.dcx", vec![1], 0));

        assert_eq!(pool.find_stem("y_l"), Some((1, 1)));
        assert_eq!(pool.find_stem("y"), None);
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut pool = ContainerPool::new(3);
        {
            let (a, b) = pool.pair_mut(2, 0).unwrap();
            a.push(Entry::new("a.tpf.dcx", vec![0; 3], 0));
            b.push(Entry::new("b.tpf.dcx", vec![0; 1], 0));
        }
        assert_eq!(pool.sizes(), vec![1, 0, 3]);
        assert!(pool.pair_mut(1, 1).is_none());
        assert!(pool.pair_mut(0, 5).is_none());
    }
}
