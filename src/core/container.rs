//! Binder containers
//!
//! A container is an ordered list of texture entries. Entry ids always mirror
//! the entry's position: after every mutation they read `0..len` with no gaps.
//! The byte total is kept in step with every insert and removal.

use crate::core::names::{base_identifier, detail_of, is_low_detail, low_detail_of, stem_of};

/// A single named payload inside a binder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position-derived id, rewritten by the owning container
    pub id: u32,

    /// Entry name (e.g. "m30_00_wall.tpf.dcx")
    pub name: String,

    /// Packaged bytes
    pub payload: Vec<u8>,

    /// Texture format tag carried through to the container header
    pub format_tag: u8,
}

impl Entry {
    /// Create a detached entry; the id is assigned when it joins a container
    pub fn new(name: impl Into<String>, payload: Vec<u8>, format_tag: u8) -> Self {
        Entry {
            id: 0,
            name: name.into(),
            payload,
            format_tag,
        }
    }

    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn stem(&self) -> &str {
        stem_of(&self.name)
    }

    pub fn base_identifier(&self) -> &str {
        base_identifier(&self.name)
    }

    pub fn is_low_detail(&self) -> bool {
        is_low_detail(&self.name)
    }

    /// Stem of the entry this one pairs with (`a` <-> `a_l`)
    pub fn counterpart_stem(&self) -> String {
        if self.is_low_detail() {
            detail_of(self.stem()).to_string()
        } else {
            low_detail_of(self.stem())
        }
    }
}

/// Ordered collection of entries with dense ids and a running byte total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    entries: Vec<Entry>,
    size: u64,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from entries in order, renumbering their ids
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let size = entries.iter().map(Entry::len).sum();
        let mut container = Container { entries, size };
        container.renumber_from(0);
        container
    }

    /// Sum of payload lengths
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Append at the end and return the new entry's index
    pub fn push(&mut self, mut entry: Entry) -> usize {
        let index = self.entries.len();
        entry.id = index as u32;
        self.size += entry.len();
        self.entries.push(entry);
        index
    }

    /// Insert at `index`, clamped to the end of the container
    pub fn insert(&mut self, index: usize, entry: Entry) -> usize {
        let index = index.min(self.entries.len());
        self.size += entry.len();
        self.entries.insert(index, entry);
        self.renumber_from(index);
        index
    }

    /// Remove the entry at `index`, shifting later ids down by one
    pub fn remove(&mut self, index: usize) -> Option<Entry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.size -= entry.len();
        self.renumber_from(index);
        Some(entry)
    }

    /// Replace the entry at `index`, keeping its position and id
    pub fn replace(&mut self, index: usize, mut entry: Entry) -> Option<Entry> {
        let slot = self.entries.get_mut(index)?;
        entry.id = index as u32;
        self.size = self.size - slot.len() + entry.len();
        Some(std::mem::replace(slot, entry))
    }

    /// Remove every entry failing `keep`, in index order, and return the bytes freed
    ///
    /// Entries are dropped one at a time so ids stay dense after each removal.
    pub fn retain_entries<F>(&mut self, mut keep: F) -> u64
    where
        F: FnMut(&Entry) -> bool,
    {
        let mut freed = 0;
        let mut index = 0;
        while index < self.entries.len() {
            if keep(&self.entries[index]) {
                index += 1;
            } else if let Some(entry) = self.remove(index) {
                freed += entry.len();
            }
        }
        freed
    }

    /// Index of the entry with exactly this stem
    pub fn position_of_stem(&self, stem: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.stem() == stem)
    }

    /// Index of the first entry with this base identifier
    pub fn position_of_base(&self, base: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.base_identifier() == base)
    }

    /// Check the dense id invariant
    pub fn ids_are_dense(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, e)| e.id as usize == i)
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    fn renumber_from(&mut self, start: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate().skip(start) {
            entry.id = i as u32;
        }
    }
}
