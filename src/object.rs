//! # Object
//!
//! This module defines the heap-allocated object model: right now the only
//! object kind is an interned string, but the layout (a tagged [`Object`]
//! living in the VM's [`Heap`] arena, referenced from [`Value`] by a
//! non-owning [`ObjHandle`]) leaves room for more kinds later.

use std::fmt::Display;

use crate::value::Value;

/// FNV-1a, 32-bit, as used by clox for string hashing.
const FNV_OFFSET_BASIS: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

/// Hash a byte string with 32-bit FNV-1a.
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
  let mut hash = FNV_OFFSET_BASIS;
  for &byte in bytes {
    hash ^= byte as u32;
    hash = hash.wrapping_mul(FNV_PRIME);
  }
  hash
}

/// ## Object Type
///
/// The tag of a heap object. Only `String` exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjType {
  String,
}

/// ## ObjString
///
/// An immutable byte string with a hash computed once at construction.
/// Interning (see [`crate::table::InternTable`]) guarantees at most one live
/// `ObjString` per distinct byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjString {
  pub(crate) bytes: Box<[u8]>,
  pub(crate) hash: u32,
}

impl ObjString {
  fn new(bytes: Box<[u8]>) -> Self {
    let hash = fnv1a_hash(&bytes);
    Self { bytes, hash }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn as_str(&self) -> &str {
    // The scanner only ever produces valid UTF-8 lexemes, and concatenation
    // only ever joins two such strings, so this always holds.
    std::str::from_utf8(&self.bytes).expect("ObjString bytes are always valid UTF-8")
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

impl Display for ObjString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// ## Object
///
/// A heap object, tagged by kind. Lives in the VM's [`Heap`] arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
  String(ObjString),
}

impl Object {
  pub fn obj_type(&self) -> ObjType {
    match self {
      Object::String(_) => ObjType::String,
    }
  }
}

/// ## ObjHandle
///
/// A non-owning reference to an [`Object`] living in the VM's [`Heap`]
/// arena. Two handles compare equal iff they index the same slot, which is
/// exactly the identity-equality the spec requires of interned strings:
/// content-equal strings are interned to the same handle, so handle equality
/// and content equality coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjHandle(u32);

impl ObjHandle {
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// ## Heap
///
/// The arena all heap objects live in, owned by the [`crate::vm::VM`]. This
/// is the Rust realization of the spec's "intrusive free-list of
/// heterogeneous objects": every allocation appends to `objects`, and
/// [`Heap::free`] drops them all in one O(objects) pass, mirroring "walk the
/// object list freeing each object" without raw pointers.
#[derive(Debug, Default)]
pub struct Heap {
  objects: Vec<Object>,
}

impl Heap {
  pub fn init() -> Self {
    Self::default()
  }

  /// Allocate `object` into the arena, returning a handle to it. Every
  /// allocation path in this module funnels through here so that no object
  /// can exist outside the arena the VM tears down at `free`.
  fn allocate(&mut self, object: Object) -> ObjHandle {
    self.objects.push(object);
    ObjHandle((self.objects.len() - 1) as u32)
  }

  pub fn get(&self, handle: ObjHandle) -> &Object {
    &self.objects[handle.index()]
  }

  pub fn string(&self, handle: ObjHandle) -> &ObjString {
    match self.get(handle) {
      Object::String(s) => s,
    }
  }

  /// Drop every object allocated during the VM's lifetime.
  pub fn free(&mut self) {
    self.objects.clear();
  }

  pub fn len(&self) -> usize {
    self.objects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.objects.is_empty()
  }

  /// Allocate a fresh `ObjString` copied out of `bytes`, bypassing the
  /// intern table. Callers that want interning should go through
  /// `VM::copy_string`/`VM::take_string` instead; this is the raw allocation
  /// primitive those build on, mirroring `allocateString` in `object.c`.
  pub(crate) fn alloc_string(&mut self, bytes: Box<[u8]>) -> (ObjHandle, u32) {
    let obj = ObjString::new(bytes);
    let hash = obj.hash;
    (self.allocate(Object::String(obj)), hash)
  }
}

impl Value {
  pub fn is_string(&self, heap: &Heap) -> bool {
    match self {
      Value::Object(h) => heap.get(*h).obj_type() == ObjType::String,
      _ => false,
    }
  }

  /// Format this value for `print`/`OP_RETURN` output. Numbers use `{}`
  /// (Rust's shortest round-trip float format, the idiomatic analogue of
  /// C's `%g`), booleans print as `true`/`false`, `nil` prints as `nil`,
  /// strings print as their bare payload with no surrounding quotes.
  pub fn format(&self, heap: &Heap) -> String {
    match self {
      Value::Nil => "nil".to_owned(),
      Value::Bool(b) => b.to_string(),
      Value::Number(n) => format_number(*n),
      Value::Object(h) => heap.string(*h).as_str().to_owned(),
    }
  }
}

/// Render a double the way clox's `%g` would: integral values print without
/// a trailing `.0`.
fn format_number(n: f64) -> String {
  if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
    // `as i64` has no signed zero, so `-0.0 as i64 == 0` would silently
    // drop the sign clox's `%g` preserves.
    if n == 0.0 && n.is_sign_negative() {
      "-0".to_owned()
    } else {
      format!("{}", n as i64)
    }
  } else {
    format!("{n}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fnv1a_matches_known_vector() {
    // FNV-1a("") == offset basis.
    assert_eq!(fnv1a_hash(b""), FNV_OFFSET_BASIS);
  }

  #[test]
  fn negative_zero_keeps_its_sign() {
    assert_eq!(format_number(-0.0), "-0");
    assert_eq!(format_number(0.0), "0");
  }

  #[test]
  fn heap_handles_are_stable_indices() {
    let mut heap = Heap::init();
    let (a, _) = heap.alloc_string(b"hello".to_vec().into_boxed_slice());
    let (b, _) = heap.alloc_string(b"world".to_vec().into_boxed_slice());
    assert_ne!(a, b);
    assert_eq!(heap.string(a).as_str(), "hello");
    assert_eq!(heap.string(b).as_str(), "world");
  }

  #[test]
  fn heap_free_drops_everything() {
    let mut heap = Heap::init();
    heap.alloc_string(b"x".to_vec().into_boxed_slice());
    assert_eq!(heap.len(), 1);
    heap.free();
    assert_eq!(heap.len(), 0);
  }
}
