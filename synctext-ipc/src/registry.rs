//! Shared-memory peer registry (spec.md §4.4).
//!
//! The mapped region is treated as a raw byte window: every mutating
//! access to a slot's `active` flag goes through an atomic load/CAS at that
//! field's byte offset, never through a typed `&mut Registry` reference, to
//! stay sound under cross-process aliasing (spec.md §9, "Cross-process
//! shared structure"). `uid`/`queue_name` bytes are plain writes, made only
//! immediately after a successful `0 -> 1` CAS on `active` or immediately
//! before/after a `1 -> 0` store, per spec.md §5's "Shared-resource
//! discipline".

use crate::{IpcError, IpcResult};
use std::ffi::CStr;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicI32, Ordering};
use synctext_types::Uid;

/// Shared memory object name (spec.md §3, §6).
pub const SHM_NAME: &str = "/synctext_registry_v1\0";

/// Fixed slot count (spec.md §3).
pub const MAX_USERS: usize = 5;

const UID_FIELD_LEN: usize = 32;
const QUEUE_NAME_FIELD_LEN: usize = 64;

#[repr(C)]
struct RawSlot {
    uid: [u8; UID_FIELD_LEN],
    queue_name: [u8; QUEUE_NAME_FIELD_LEN],
    active: i32,
}

#[repr(C)]
struct RawRegistry {
    slots: [RawSlot; MAX_USERS],
    num_users: i32,
}

/// A claimed registry slot index, returned by [`Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(pub usize);

/// A peer observed live in the registry's snapshot iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivePeer {
    pub uid: String,
    pub queue_name: String,
}

/// A handle to the mapped `/synctext_registry_v1` shared memory object.
pub struct Registry {
    ptr: *mut RawRegistry,
    fd: libc::c_int,
}

// SAFETY: all mutable access goes through atomic ops or is synchronized by
// the CAS protocol on `active`; the raw pointer itself is never aliased
// mutably from Rust's point of view (we only ever take `&self`).
unsafe impl Send for Registry {}
unsafe impl Sync for Registry {}

impl Registry {
    /// Opens (creating if necessary) the shared registry, zero-initializing
    /// it only if every slot is currently inactive (spec.md §4.4).
    pub fn open() -> IpcResult<Self> {
        let size = std::mem::size_of::<RawRegistry>();

        // SAFETY: SHM_NAME is a valid NUL-terminated C string literal.
        let fd = unsafe {
            libc::shm_open(
                SHM_NAME.as_ptr().cast::<libc::c_char>(),
                libc::O_RDWR | libc::O_CREAT,
                0o666,
            )
        };
        if fd < 0 {
            return Err(IpcError::ShmOpen(std::io::Error::last_os_error()));
        }

        // SAFETY: fd is a valid, open file descriptor.
        let truncate_rc = unsafe { libc::ftruncate(fd, size as libc::off_t) };
        if truncate_rc != 0 {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(IpcError::ShmTruncate(err));
        }

        // SAFETY: fd is valid and sized to at least `size` bytes.
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(IpcError::Mmap(err));
        }

        let registry = Self {
            ptr: addr.cast::<RawRegistry>(),
            fd,
        };

        if !registry.any_slot_active() {
            // SAFETY: `addr` is a valid mapping of exactly `size` bytes and
            // no other reference to it exists yet (we just created it).
            unsafe { std::ptr::write_bytes(addr.cast::<u8>(), 0, size) };
        }

        Ok(registry)
    }

    fn any_slot_active(&self) -> bool {
        (0..MAX_USERS).any(|i| self.load_active(i) == 1)
    }

    fn active_atomic(&self, slot: usize) -> &AtomicI32 {
        // SAFETY: `slot < MAX_USERS`, `self.ptr` is a valid mapping for the
        // lifetime of `self`, and `active` is naturally aligned for `i32`
        // within `#[repr(C)] RawSlot`.
        unsafe {
            let field = std::ptr::addr_of!((*self.ptr).slots[slot].active) as *mut i32;
            &*(field.cast::<AtomicI32>())
        }
    }

    fn load_active(&self, slot: usize) -> i32 {
        self.active_atomic(slot).load(Ordering::SeqCst)
    }

    fn cas_active(&self, slot: usize, current: i32, new: i32) -> bool {
        self.active_atomic(slot)
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn uid_matches(&self, slot: usize, uid: &Uid) -> bool {
        self.read_cstr_field(slot, true) == uid.as_str()
    }

    /// Reads a slot's `uid` (`field_is_uid = true`) or `queue_name` field
    /// up to its NUL terminator.
    fn read_cstr_field(&self, slot: usize, field_is_uid: bool) -> String {
        // SAFETY: the field is always NUL-terminated by `write_field`/the
        // zero-initialization at `open`, and lies within the mapping.
        unsafe {
            let ptr = if field_is_uid {
                std::ptr::addr_of!((*self.ptr).slots[slot].uid).cast::<u8>()
            } else {
                std::ptr::addr_of!((*self.ptr).slots[slot].queue_name).cast::<u8>()
            };
            let len = if field_is_uid {
                UID_FIELD_LEN
            } else {
                QUEUE_NAME_FIELD_LEN
            };
            let slice = std::slice::from_raw_parts(ptr, len);
            // Guarantee a NUL exists even if memory was never cleared.
            let nul_pos = slice.iter().position(|&b| b == 0).unwrap_or(len - 1);
            CStr::from_bytes_with_nul(&slice[..=nul_pos])
                .map(|c| c.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    }

    fn write_field(&self, slot: usize, field_is_uid: bool, value: &str) {
        let len = if field_is_uid {
            UID_FIELD_LEN
        } else {
            QUEUE_NAME_FIELD_LEN
        };
        // SAFETY: `slot < MAX_USERS`; writes stay within the field's
        // `len` bytes and this function is only called immediately after a
        // winning CAS on that slot's `active` flag, so no other writer can
        // be touching these bytes concurrently.
        unsafe {
            let ptr = if field_is_uid {
                std::ptr::addr_of_mut!((*self.ptr).slots[slot].uid).cast::<u8>()
            } else {
                std::ptr::addr_of_mut!((*self.ptr).slots[slot].queue_name).cast::<u8>()
            };
            std::ptr::write_bytes(ptr, 0, len);
            let bytes = value.as_bytes();
            let copy_len = bytes.len().min(len - 1);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, copy_len);
        }
    }

    /// Claims a slot for `uid` (spec.md §4.4, "Slot claim").
    ///
    /// Two-pass lock-free protocol: first try to reuse a slot already
    /// carrying this `uid` (idempotent re-registration), then claim any
    /// free slot. Returns [`IpcError::Full`] if no slot is available.
    pub fn register(&self, uid: &Uid) -> IpcResult<SlotId> {
        for i in 0..MAX_USERS {
            if self.uid_matches(i, uid) {
                if self.load_active(i) == 1 {
                    tracing::debug!("{uid} reusing already-active slot {i}");
                    return Ok(SlotId(i));
                }
                if self.cas_active(i, 0, 1) {
                    tracing::debug!("{uid} reclaimed its previous slot {i}");
                    return Ok(SlotId(i));
                }
            }
        }

        for i in 0..MAX_USERS {
            if self.load_active(i) != 0 {
                continue;
            }
            if !self.cas_active(i, 0, 1) {
                continue;
            }
            self.write_field(i, true, uid.as_str());
            self.write_field(i, false, &uid.queue_name());
            self.bump_num_users(1);
            tracing::info!("{uid} claimed slot {i}");
            return Ok(SlotId(i));
        }

        tracing::warn!("registry full, {uid} could not claim a slot");
        Err(IpcError::Full)
    }

    /// Releases a previously claimed slot. Idempotent (spec.md §4.4).
    pub fn release(&self, slot: SlotId) {
        let SlotId(i) = slot;
        if i >= MAX_USERS {
            return;
        }
        self.active_atomic(i).store(0, Ordering::SeqCst);
        self.write_field(i, true, "");
        self.write_field(i, false, "");
        self.bump_num_users(-1);
        tracing::info!("released slot {i}");
    }

    /// Best-effort `numUsers` adjustment, floored at 0 and capped at
    /// `MAX_USERS` (spec.md §3 — advisory only; `active` flags are
    /// authoritative).
    fn bump_num_users(&self, delta: i32) {
        // SAFETY: `num_users` is within the mapping; this field is
        // explicitly advisory (spec.md §3) so a plain, non-atomic
        // read-modify-write matches the reference design.
        unsafe {
            let ptr = std::ptr::addr_of_mut!((*self.ptr).num_users);
            let current = std::ptr::read(ptr);
            let updated = (current + delta).clamp(0, MAX_USERS as i32);
            std::ptr::write(ptr, updated);
        }
    }

    /// Iterates all slots, returning those live under the rule "`active ==
    /// 1` AND `uid` non-empty" (spec.md §4.4, "Snapshot iteration").
    #[must_use]
    pub fn snapshot(&self) -> Vec<LivePeer> {
        (0..MAX_USERS)
            .filter(|&i| self.load_active(i) == 1)
            .filter_map(|i| {
                let uid = self.read_cstr_field(i, true);
                if uid.is_empty() {
                    return None;
                }
                let queue_name = self.read_cstr_field(i, false);
                Some(LivePeer { uid, queue_name })
            })
            .collect()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        // SAFETY: `self.ptr`/`self.fd` were produced by a successful
        // `open()` and are not used again after `drop`.
        unsafe {
            libc::munmap(self.ptr.cast::<c_void>(), std::mem::size_of::<RawRegistry>());
            libc::close(self.fd);
        }
    }
}
