//! Generational storage for emulated objects.
//!
//! Every entry is addressed by a [`Slot`] that packs an index and a
//! generation. Removing an entry bumps the generation of its index, so any
//! slot handed out before the removal no longer resolves, even after the
//! index is reused for a new entry. An index whose generation is exhausted
//! is retired instead of reused, so a stale slot can never wrap around to a
//! live entry.

use crate::profiling::profile_function;
use std::num::NonZeroU64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NonZeroU64);

impl Slot {
    pub fn new(generation: u32, index: u32) -> Self {
        let packed = ((generation as u64) << 32) | (index as u64 + 1);
        match NonZeroU64::new(packed) {
            Some(value) => Self(value),
            // index + 1 is never zero for any u32 index below u32::MAX
            None => unreachable!("slot index overflow"),
        }
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

pub struct ObjectTable<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> ObjectTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> Slot {
        profile_function!();
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            Slot::new(entry.generation, index)
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                value: Some(value),
            });
            Slot::new(0, index)
        }
    }

    fn entry(&self, slot: Slot) -> Option<&Entry<T>> {
        self.entries
            .get(slot.index() as usize)
            .filter(|entry| entry.generation == slot.generation())
    }

    /// Returns `None` for slots whose entry has been removed.
    pub fn get(&self, slot: Slot) -> Option<&T> {
        self.entry(slot).and_then(|entry| entry.value.as_ref())
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        self.entries
            .get_mut(slot.index() as usize)
            .filter(|entry| entry.generation == slot.generation())
            .and_then(|entry| entry.value.as_mut())
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        profile_function!();
        let index = slot.index();
        let entry = self
            .entries
            .get_mut(index as usize)
            .filter(|entry| entry.generation == slot.generation())?;
        let value = entry.value.take()?;
        match entry.generation.checked_add(1) {
            Some(generation) => {
                entry.generation = generation;
                self.free.push(index);
            }
            None => tracing::debug!("object table index {} retired", index),
        }
        self.live -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> ObjectTableIter<'_, T> {
        ObjectTableIter {
            entries: self.entries.iter().enumerate(),
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Slot, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(index, entry)| {
                let generation = entry.generation;
                entry
                    .value
                    .as_mut()
                    .map(|value| (Slot::new(generation, index as u32), value))
            })
    }
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ObjectTableIter<'a, T> {
    entries: std::iter::Enumerate<std::slice::Iter<'a, Entry<T>>>,
}

impl<'a, T> Iterator for ObjectTableIter<'a, T> {
    type Item = (Slot, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, entry) in self.entries.by_ref() {
            if let Some(value) = entry.value.as_ref() {
                return Some((Slot::new(entry.generation, index as u32), value));
            }
        }
        None
    }
}

static_assertions::assert_eq_size!(Slot, Option<Slot>);
