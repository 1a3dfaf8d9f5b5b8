//! # Table
//!
//! A hand-rolled open-addressed hash table used exclusively for string
//! interning. Unlike a general-purpose map, its only lookup operation is
//! [`InternTable::find_string`], which resolves a candidate by
//! `(hash, length, bytes)` rather than by key identity, since at the moment
//! of interning there is no existing handle to compare against yet.
//!
//! This is deliberately hand-rolled rather than built on
//! `std::collections::HashMap`: open addressing with tombstones and a
//! content-addressed probe are the spec's actual algorithmic content here,
//! not an implementation detail `HashMap` could stand in for.

use crate::{
  memory::INITIAL_TABLE_CAPACITY,
  object::{Heap, ObjHandle},
};

const MAX_LOAD_FACTOR: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
enum Slot {
  Empty,
  Tombstone,
  Occupied { hash: u32, handle: ObjHandle },
}

/// ## InternTable
///
/// Open-addressed, linear-probed, with tombstones left behind by deletion so
/// that later probes don't stop short of a live entry that hashed past the
/// deleted slot. Grows (doubling) whenever `count + 1` would exceed
/// `capacity * MAX_LOAD_FACTOR`; resize rehashes every live entry and drops
/// tombstones, so `count` afterwards exactly equals the number of live
/// entries.
#[derive(Debug)]
pub struct InternTable {
  entries: Vec<Slot>,
  /// Live entries plus tombstones; used against the load-factor check so a
  /// probe sequence dominated by tombstones still triggers a resize.
  count: usize,
}

impl Default for InternTable {
  fn default() -> Self {
    Self {
      entries: Vec::new(),
      count: 0,
    }
  }
}

impl InternTable {
  pub fn init() -> Self {
    Self::default()
  }

  fn capacity(&self) -> usize {
    self.entries.len()
  }

  /// Probe for the slot a key with this hash should occupy: either a live
  /// entry matching `bytes`, or the first empty/tombstone slot encountered
  /// (tombstones are preferred over empty slots so insertion reuses them).
  fn find_slot(&self, hash: u32, bytes: &[u8], heap: &Heap) -> usize {
    let capacity = self.capacity();
    let mut index = (hash as usize) % capacity;
    let mut tombstone: Option<usize> = None;
    loop {
      match self.entries[index] {
        Slot::Empty => return tombstone.unwrap_or(index),
        Slot::Tombstone => {
          if tombstone.is_none() {
            tombstone = Some(index);
          }
        }
        Slot::Occupied { hash: h, handle } => {
          if h == hash && heap.string(handle).as_bytes() == bytes {
            return index;
          }
        }
      }
      index = (index + 1) % capacity;
    }
  }

  fn grow(&mut self, heap: &Heap) {
    let new_capacity = if self.capacity() < INITIAL_TABLE_CAPACITY {
      INITIAL_TABLE_CAPACITY
    } else {
      self.capacity() * 2
    };
    let old_entries = std::mem::replace(&mut self.entries, vec![Slot::Empty; new_capacity]);
    self.count = 0;
    for slot in old_entries {
      if let Slot::Occupied { hash, handle } = slot {
        let bytes = heap.string(handle).as_bytes().to_vec();
        let index = self.find_slot(hash, &bytes, heap);
        self.entries[index] = Slot::Occupied { hash, handle };
        self.count += 1;
      }
    }
  }

  /// Find an already-interned string matching `(hash, bytes)`, if any.
  pub fn find_string(&self, hash: u32, bytes: &[u8], heap: &Heap) -> Option<ObjHandle> {
    if self.capacity() == 0 {
      return None;
    }
    match self.entries[self.find_slot(hash, bytes, heap)] {
      Slot::Occupied { handle, .. } => Some(handle),
      _ => None,
    }
  }

  /// Record that `handle` (hashing to `hash`, with the given byte content)
  /// is now interned. Callers must have already checked `find_string`
  /// returned `None` — this never overwrites an existing entry for the same
  /// content, since the only caller (`VM::copy_string`/`take_string`) always
  /// checks first.
  pub fn insert(&mut self, hash: u32, bytes: &[u8], handle: ObjHandle, heap: &Heap) {
    if (self.count + 1) as f64 > self.capacity() as f64 * MAX_LOAD_FACTOR {
      self.grow(heap);
    }
    let index = self.find_slot(hash, bytes, heap);
    let was_new = !matches!(self.entries[index], Slot::Occupied { .. });
    self.entries[index] = Slot::Occupied { hash, handle };
    if was_new {
      self.count += 1;
    }
  }

  /// Remove the entry matching `(hash, bytes)`, leaving a tombstone behind
  /// so later probes for keys that hashed past this slot still find them.
  /// Not used by string interning itself (strings are never un-interned in
  /// this core) but kept as a complete `Table` operation, matching
  /// `tableDelete` in `table.h`.
  pub fn delete(&mut self, hash: u32, bytes: &[u8], heap: &Heap) -> bool {
    if self.capacity() == 0 {
      return false;
    }
    let index = self.find_slot(hash, bytes, heap);
    if matches!(self.entries[index], Slot::Occupied { .. }) {
      self.entries[index] = Slot::Tombstone;
      true
    } else {
      false
    }
  }

  pub fn free(&mut self) {
    self.entries.clear();
    self.count = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::object::fnv1a_hash;

  fn intern(table: &mut InternTable, heap: &mut Heap, s: &str) -> ObjHandle {
    let bytes = s.as_bytes();
    let hash = fnv1a_hash(bytes);
    if let Some(handle) = table.find_string(hash, bytes, heap) {
      return handle;
    }
    let (handle, hash) = heap.alloc_string(bytes.to_vec().into_boxed_slice());
    table.insert(hash, s.as_bytes(), handle, heap);
    handle
  }

  #[test]
  fn interning_is_idempotent() {
    let mut heap = Heap::init();
    let mut table = InternTable::init();
    let a = intern(&mut table, &mut heap, "hello");
    let b = intern(&mut table, &mut heap, "hello");
    assert_eq!(a, b);
    assert_eq!(heap.len(), 1);
  }

  #[test]
  fn distinct_content_gets_distinct_handles() {
    let mut heap = Heap::init();
    let mut table = InternTable::init();
    let a = intern(&mut table, &mut heap, "foo");
    let b = intern(&mut table, &mut heap, "bar");
    assert_ne!(a, b);
  }

  #[test]
  fn delete_leaves_tombstone_that_does_not_break_later_probes() {
    let mut heap = Heap::init();
    let mut table = InternTable::init();
    let a = intern(&mut table, &mut heap, "aa");
    let hash_a = fnv1a_hash(b"aa");
    assert!(table.delete(hash_a, b"aa", &heap));
    assert_eq!(table.find_string(hash_a, b"aa", &heap), None);
    // Re-interning after deletion allocates a fresh object (the table
    // doesn't special-case this; the spec only guarantees uniqueness across
    // *live* interned strings).
    let b = intern(&mut table, &mut heap, "aa");
    assert_ne!(a, b);
  }

  #[test]
  fn survives_growth_past_load_factor() {
    let mut heap = Heap::init();
    let mut table = InternTable::init();
    let mut handles = Vec::new();
    for i in 0..64 {
      handles.push(intern(&mut table, &mut heap, &format!("key-{i}")));
    }
    for (i, &h) in handles.iter().enumerate() {
      let again = intern(&mut table, &mut heap, &format!("key-{i}"));
      assert_eq!(h, again);
    }
  }
}
