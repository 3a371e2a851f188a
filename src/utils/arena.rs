//! A flat table of backend records addressed by generational handles.

use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

#[derive(Debug, Clone)]
struct Entry<T> {
    version: HandleIndex,
    value: Option<T>,
}

/// `Arena` stores records in a `Vec` and hands out handles made of the slot
/// index and the slot version. Slot 0 is always reserved and is addressed by
/// the nil handle; it may hold a value (e.g. the default framebuffer) or stay
/// empty.
///
/// Freed slots are recycled with a bumped version, so stale handles are
/// rejected instead of silently aliasing a newer record.
#[derive(Debug, Clone)]
pub struct Arena<H: HandleLike, T> {
    entries: Vec<Entry<T>>,
    frees: Vec<HandleIndex>,
    _phantom: PhantomData<H>,
}

impl<H: HandleLike, T> Default for Arena<H, T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<H: HandleLike, T> Arena<H, T> {
    /// Creates a arena whose reserved slot is empty.
    pub fn new() -> Self {
        Arena {
            entries: vec![Entry {
                version: 0,
                value: None,
            }],
            frees: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Creates a arena whose reserved slot holds `value`.
    pub fn with_reserved(value: T) -> Self {
        let mut arena = Arena::new();
        arena.entries[0].value = Some(value);
        arena
    }

    /// Stores `value` in a free slot and returns its handle.
    pub fn insert(&mut self, value: T) -> H {
        if let Some(index) = self.frees.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            H::new(index, entry.version)
        } else {
            let index = self.entries.len() as HandleIndex;
            self.entries.push(Entry {
                version: 1,
                value: Some(value),
            });
            H::new(index, 1)
        }
    }

    /// Removes the record addressed by `handle`. The reserved slot can not be
    /// freed.
    pub fn free(&mut self, handle: H) -> Option<T> {
        if handle.index() == 0 || !self.contains(handle) {
            return None;
        }

        let entry = &mut self.entries[handle.index() as usize];
        entry.version += 1;
        self.frees.push(handle.index());
        entry.value.take()
    }

    /// Returns true if `handle` addresses a live record.
    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        match self.entries.get(handle.index() as usize) {
            Some(entry) if entry.version == handle.version() => entry.value.as_ref(),
            _ => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        match self.entries.get_mut(handle.index() as usize) {
            Some(entry) if entry.version == handle.version() => entry.value.as_mut(),
            _ => None,
        }
    }

    /// Returns the number of slots, the reserved one included. Handles with
    /// indices at or beyond this value have never been issued.
    #[inline]
    pub fn slots(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of live records, the reserved one included.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|v| v.value.is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, v)| {
            v.value
                .as_ref()
                .map(|value| (H::new(i as HandleIndex, v.version), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.entries.iter_mut().enumerate().filter_map(|(i, v)| {
            let version = v.version;
            v.value
                .as_mut()
                .map(move |value| (H::new(i as HandleIndex, version), value))
        })
    }

    /// Removes every record, the reserved one included, in slot order.
    pub fn drain(&mut self) -> Vec<T> {
        let values = self
            .entries
            .iter_mut()
            .filter_map(|v| v.value.take())
            .collect();

        self.frees.clear();
        self.entries.truncate(1);
        values
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::handle::Handle;

    #[test]
    fn reserved_slot() {
        let arena: Arena<Handle, u32> = Arena::new();
        assert!(!arena.contains(Handle::nil()));
        assert_eq!(arena.slots(), 1);
        assert!(arena.is_empty());

        let arena: Arena<Handle, u32> = Arena::with_reserved(7);
        assert_eq!(arena.get(Handle::nil()), Some(&7));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn insert_and_get() {
        let mut arena: Arena<Handle, &'static str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(a, Handle::new(1, 1));
        assert_eq!(b, Handle::new(2, 1));
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.get(Handle::new(3, 1)), None);

        *arena.get_mut(a).unwrap() = "c";
        assert_eq!(arena.get(a), Some(&"c"));
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut arena: Arena<Handle, u32> = Arena::with_reserved(0);
        let a = arena.insert(1);
        assert_eq!(arena.free(a), Some(1));
        assert_eq!(arena.free(a), None);
        assert!(!arena.contains(a));

        let b = arena.insert(2);
        assert_eq!(b.index(), a.index());
        assert_ne!(b.version(), a.version());
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), Some(&2));

        assert_eq!(arena.free(Handle::nil()), None);
        assert_eq!(arena.get(Handle::nil()), Some(&0));
    }

    #[test]
    fn iterate() {
        let mut arena: Arena<Handle, u32> = Arena::with_reserved(0);
        for i in 1..5 {
            arena.insert(i);
        }

        let sum: u32 = arena.iter().map(|(_, v)| *v).sum();
        assert_eq!(sum, 10);

        for (_, v) in arena.iter_mut() {
            *v *= 2;
        }

        assert_eq!(arena.drain(), vec![0, 2, 4, 6, 8]);
        assert_eq!(arena.slots(), 1);
        assert!(arena.is_empty());
    }
}
