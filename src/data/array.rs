//! Array: a flat buffer with an optional device-resident mirror.
//!
//! The host side is the source of truth for all computation in this crate;
//! the device side is a synchronization contract for callers that stage data
//! on an accelerator. Coherence is cooperative: whichever side was written
//! last marks the other side stale, and callers issue explicit
//! `clone_to_device` / `clone_from_device` / `sync_host_device` calls. There
//! is no automatic tracking beyond the two boolean flags, and on targets
//! without an accelerator the sync calls degrade to host-side copies.

use crate::data::storage::{Storage, VecStorage};
use crate::remap_error::MeshRemapError;

/// Resizable buffer with host/device staleness bookkeeping.
#[derive(Debug, Clone)]
pub struct Array<V, S: Storage<V> = VecStorage<V>> {
    host: S,
    /// Device mirror; allocated lazily on the first `clone_to_device`.
    device: Option<S>,
    host_needs_update: bool,
    device_needs_update: bool,
    _marker: std::marker::PhantomData<V>,
}

impl<V: Clone, S: Storage<V> + Clone> Array<V, S> {
    /// An empty host-only array.
    pub fn new() -> Self
    where
        V: Default,
    {
        Self::with_len(0, V::default())
    }

    /// A host-only array of `len` cells filled with `fill`.
    pub fn with_len(len: usize, fill: V) -> Self {
        Self {
            host: S::with_len(len, fill),
            device: None,
            host_needs_update: false,
            device_needs_update: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Adopt an existing buffer as host storage.
    pub fn from_storage(host: S) -> Self {
        Self {
            host,
            device: None,
            host_needs_update: false,
            device_needs_update: false,
            _marker: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.host.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
    }

    /// Host bytes currently allocated.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.host.len() * std::mem::size_of::<V>()
    }

    /// Read-only host view.
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        debug_assert!(!self.host_needs_update, "host view read while host is stale");
        self.host.as_slice()
    }

    /// Mutable host view; the device mirror becomes stale.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [V] {
        if self.device.is_some() {
            self.device_needs_update = true;
        }
        self.host.as_mut_slice()
    }

    /// Grow or shrink the host buffer; the device mirror becomes stale.
    pub fn resize(&mut self, new_len: usize, fill: V) {
        self.host.resize(new_len, fill);
        if self.device.is_some() {
            self.device_needs_update = true;
        }
    }

    /// Open a gap of `count` cells before `pos` (see [`Storage::insert_gap`]).
    pub fn insert(&mut self, pos: usize, count: usize, fill: V) -> Result<(), MeshRemapError> {
        self.host.insert_gap(pos, count, fill)?;
        if self.device.is_some() {
            self.device_needs_update = true;
        }
        Ok(())
    }

    /// Copy the host buffer to the device mirror; the device becomes current.
    pub fn clone_to_device(&mut self) {
        self.device = Some(self.host.clone());
        self.device_needs_update = false;
        self.host_needs_update = false;
    }

    /// Copy the device mirror back to the host; the host becomes current.
    ///
    /// A no-op when no device mirror was ever created.
    pub fn clone_from_device(&mut self) {
        if let Some(dev) = &self.device {
            self.host = dev.clone();
        }
        self.host_needs_update = false;
        self.device_needs_update = false;
    }

    /// Push whichever side is current to the stale side.
    pub fn sync_host_device(&mut self) {
        if self.device_needs_update {
            self.clone_to_device();
        } else if self.host_needs_update {
            self.clone_from_device();
        }
    }

    /// Mark the host side stale (a device-side writer ran).
    pub fn set_host_needs_update(&mut self, stale: bool) {
        self.host_needs_update = stale;
    }

    /// False only when both residencies are stale at once, which indicates a
    /// broken sync protocol.
    #[inline]
    pub fn valid(&self) -> bool {
        !(self.host_needs_update && self.device_needs_update)
    }

    #[inline]
    pub fn host_needs_update(&self) -> bool {
        self.host_needs_update
    }

    #[inline]
    pub fn device_needs_update(&self) -> bool {
        self.device_needs_update
    }
}

impl<V: Clone + Default, S: Storage<V> + Clone> Default for Array<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> From<Vec<V>> for Array<V, VecStorage<V>> {
    fn from(v: Vec<V>) -> Self {
        Self::from_storage(VecStorage::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_write_marks_device_stale() {
        let mut a: Array<i32> = Array::from(vec![1, 2, 3]);
        a.clone_to_device();
        assert!(!a.device_needs_update());
        a.as_mut_slice()[0] = 9;
        assert!(a.device_needs_update());
        assert!(a.valid());
        a.sync_host_device();
        assert!(!a.device_needs_update());
    }

    #[test]
    fn no_device_mirror_means_no_staleness() {
        let mut a: Array<i32> = Array::from(vec![1]);
        a.as_mut_slice()[0] = 2;
        assert!(!a.device_needs_update());
        assert!(a.valid());
    }

    #[test]
    fn clone_from_device_restores_host() {
        let mut a: Array<i32> = Array::from(vec![5, 6]);
        a.clone_to_device();
        a.as_mut_slice()[1] = 0;
        // Discard the host write by pulling the device copy back.
        a.clone_from_device();
        assert_eq!(a.as_slice(), &[5, 6]);
    }

    #[test]
    fn resize_and_insert_keep_length_consistent() {
        let mut a: Array<i32> = Array::from(vec![1, 2]);
        a.resize(4, 0);
        assert_eq!(a.as_slice(), &[1, 2, 0, 0]);
        a.insert(1, 2, -1).unwrap();
        assert_eq!(a.as_slice(), &[1, -1, -1, 2, 0, 0]);
        assert_eq!(a.bytes(), 6 * std::mem::size_of::<i32>());
    }
}
