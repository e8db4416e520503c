//! MemVfs Tests
//!
//! Tests verify:
//! - Open routing: shared vs private names, create flag, file kinds
//! - Handle lifecycle and registry reference counting
//! - Lock protocol across handles of one database
//! - Reported capabilities

use std::thread;
use std::time::Duration;

use cowvfs::error::{CODE_BUSY, CODE_BUSY_RECOVERY, CODE_CANTOPEN, CODE_IOERR_LOCK};
use cowvfs::vfs::{AccessFlags, DeviceCharacteristics, SyncFlags};
use cowvfs::{Config, LockLevel, MemFile, MemVfs, OpenFlags, Registry, Vfs, VfsError, VfsFile, BLOCK_SIZE};

// =============================================================================
// Helper Functions
// =============================================================================

fn main_db() -> OpenFlags {
    OpenFlags::MAIN_DB | OpenFlags::READWRITE | OpenFlags::CREATE
}

fn setup_vfs() -> MemVfs {
    let config = Config::builder()
        .exclusive_lock_timeout(Duration::from_millis(5))
        .build();
    MemVfs::with_registry(Registry::new(), config)
}

fn open(vfs: &MemVfs, name: &str) -> MemFile {
    vfs.open(name, main_db()).unwrap().0
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_reports_memory_flag() {
    let vfs = setup_vfs();
    let (_file, flags) = vfs.open("/db", main_db()).unwrap();
    assert!(flags.contains(OpenFlags::MEMORY));
    assert!(flags.contains(OpenFlags::MAIN_DB));
}

#[test]
fn test_open_rejects_unsupported_kinds() {
    let vfs = setup_vfs();

    for kind in [
        OpenFlags::MAIN_JOURNAL,
        OpenFlags::WAL,
        OpenFlags::SUBJOURNAL,
        OpenFlags::SUPER_JOURNAL,
        OpenFlags::TRANSIENT_DB,
    ] {
        let err = vfs.open("/db", kind | OpenFlags::CREATE).unwrap_err();
        assert_eq!(err.code(), CODE_CANTOPEN);
    }
    assert!(vfs.registry().is_empty());
}

#[test]
fn test_open_accepts_temp_kinds() {
    let vfs = setup_vfs();
    vfs.open("", OpenFlags::TEMP_DB | OpenFlags::CREATE).unwrap();
    vfs.open("", OpenFlags::TEMP_JOURNAL | OpenFlags::CREATE).unwrap();
}

#[test]
fn test_open_unknown_shared_without_create_fails() {
    let vfs = setup_vfs();
    let err = vfs
        .open("/missing", OpenFlags::MAIN_DB | OpenFlags::READWRITE)
        .unwrap_err();
    assert!(matches!(err, VfsError::CannotOpen { .. }));
}

#[test]
fn test_open_existing_shared_without_create() {
    let vfs = setup_vfs();
    vfs.registry().create("existing", b"abc".to_vec());

    let (file, _) = vfs
        .open("/existing", OpenFlags::MAIN_DB | OpenFlags::READWRITE)
        .unwrap();

    assert!(file.is_shared());
    assert_eq!(file.size().unwrap(), 3);
}

#[test]
fn test_shared_handles_see_each_other() {
    let vfs = setup_vfs();
    let a = open(&vfs, "/shared");
    let b = open(&vfs, "/shared");

    a.write_at(b"written by a", 0).unwrap();

    let mut buf = [0u8; 12];
    b.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf, b"written by a");
}

#[test]
fn test_private_handles_are_isolated() {
    let vfs = setup_vfs();
    let a = open(&vfs, "private.db");
    let b = open(&vfs, "private.db");

    a.write_at(b"only a", 0).unwrap();

    assert!(!a.is_shared());
    assert_eq!(b.size().unwrap(), 0);
    assert!(vfs.registry().is_empty());
}

#[test]
fn test_lone_slash_is_private() {
    let vfs = setup_vfs();
    let file = open(&vfs, "/");
    assert!(!file.is_shared());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_last_close_drops_implicit_database() {
    let vfs = setup_vfs();
    let mut a = open(&vfs, "/temp");
    let mut b = open(&vfs, "/temp");
    assert_eq!(a.database().refs(), 2);

    a.close().unwrap();
    assert!(vfs.registry().contains("temp"));

    b.close().unwrap();
    assert!(!vfs.registry().contains("temp"));
}

#[test]
fn test_created_database_survives_handles() {
    let vfs = setup_vfs();
    vfs.registry().create("kept", Vec::new());

    let mut file = open(&vfs, "/kept");
    file.write_at(b"data", 0).unwrap();
    file.close().unwrap();

    let db = vfs.registry().get("kept").unwrap();
    assert_eq!(db.size(), 4);
    assert_eq!(db.refs(), 1);
}

#[test]
fn test_drop_closes_handle() {
    let vfs = setup_vfs();
    {
        let _file = open(&vfs, "/dropped");
        assert!(vfs.registry().contains("dropped"));
    }
    assert!(!vfs.registry().contains("dropped"));
}

#[test]
fn test_close_after_slot_reuse_keeps_new_database() {
    let vfs = setup_vfs();
    let mut file = open(&vfs, "/reused");

    let replacement = vfs.registry().create("reused", b"new".to_vec());
    file.close().unwrap();

    let current = vfs.registry().get("reused").unwrap();
    assert!(std::sync::Arc::ptr_eq(&current, &replacement));
}

#[test]
fn test_delete_does_not_invalidate_handle() {
    let vfs = setup_vfs();
    let file = open(&vfs, "/deleted");
    file.write_at(b"before", 0).unwrap();

    vfs.registry().delete("deleted");

    file.write_at(b"after!", 6).unwrap();
    let mut buf = [0u8; 12];
    file.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf, b"beforeafter!");
}

#[test]
fn test_closed_handle_rejects_io() {
    let vfs = setup_vfs();
    let mut file = open(&vfs, "private");
    file.close().unwrap();
    file.close().unwrap();

    assert!(file.is_closed());
    assert_eq!(file.size(), Err(VfsError::Closed));
    assert_eq!(file.write_at(b"x", 0), Err(VfsError::Closed));
}

#[test]
fn test_close_releases_locks() {
    let vfs = setup_vfs();
    let mut writer = open(&vfs, "/locks");
    let mut other = open(&vfs, "/locks");

    writer.lock(LockLevel::Shared).unwrap();
    writer.lock(LockLevel::Reserved).unwrap();
    writer.close().unwrap();

    other.lock(LockLevel::Shared).unwrap();
    other.lock(LockLevel::Reserved).unwrap();
}

// =============================================================================
// Locking Tests
// =============================================================================

#[test]
fn test_lock_protocol_across_handles() {
    let vfs = setup_vfs();
    let mut a = open(&vfs, "/proto");
    let mut b = open(&vfs, "/proto");

    a.lock(LockLevel::Shared).unwrap();
    b.lock(LockLevel::Shared).unwrap();

    a.lock(LockLevel::Reserved).unwrap();
    assert!(b.check_reserved_lock().unwrap());
    assert_eq!(b.lock(LockLevel::Reserved).unwrap_err().code(), CODE_BUSY);

    // b still reads; a cannot go exclusive until it leaves.
    let err = a.lock(LockLevel::Exclusive).unwrap_err();
    assert_eq!(err.code(), CODE_BUSY_RECOVERY);
    assert_eq!(a.lock_state(), LockLevel::Pending);

    b.unlock(LockLevel::None).unwrap();
    assert_eq!(b.lock(LockLevel::Shared).unwrap_err().code(), CODE_BUSY);

    a.lock(LockLevel::Exclusive).unwrap();
    assert_eq!(a.lock_state(), LockLevel::Exclusive);

    a.unlock(LockLevel::Shared).unwrap();
    b.lock(LockLevel::Shared).unwrap();
    assert!(!b.check_reserved_lock().unwrap());
}

#[test]
fn test_read_only_handle() {
    let vfs = setup_vfs();
    let (mut file, _) = vfs
        .open("/ro", OpenFlags::MAIN_DB | OpenFlags::READONLY | OpenFlags::CREATE)
        .unwrap();

    assert!(file.is_read_only());
    file.lock(LockLevel::Shared).unwrap();
    assert_eq!(file.lock(LockLevel::Reserved).unwrap_err().code(), CODE_IOERR_LOCK);
}

#[test]
fn test_exclusive_waits_for_reader_on_other_thread() {
    let config = Config::builder()
        .exclusive_lock_timeout(Duration::from_secs(5))
        .build();
    let vfs = MemVfs::with_registry(Registry::new(), config);

    let mut writer = open(&vfs, "/wait");
    let mut reader = open(&vfs, "/wait");
    reader.lock(LockLevel::Shared).unwrap();
    writer.lock(LockLevel::Reserved).unwrap();

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        reader.unlock(LockLevel::None).unwrap();
        reader
    });

    writer.lock(LockLevel::Exclusive).unwrap();
    assert_eq!(writer.lock_state(), LockLevel::Exclusive);

    let _reader = releaser.join().unwrap();
}

// =============================================================================
// Capability Tests
// =============================================================================

#[test]
fn test_reported_capabilities() {
    let vfs = setup_vfs();
    let file = open(&vfs, "/caps");

    assert_eq!(file.sector_size(), BLOCK_SIZE);
    let caps = file.device_characteristics();
    assert!(caps.contains(DeviceCharacteristics::ATOMIC));
    assert!(caps.contains(DeviceCharacteristics::SAFE_APPEND));
    assert!(caps.contains(DeviceCharacteristics::POWERSAFE_OVERWRITE));
    assert!(caps.contains(DeviceCharacteristics::SEQUENTIAL));
    file.sync(SyncFlags::FULL).unwrap();
}

#[test]
fn test_naming_surface_is_inert() {
    let vfs = setup_vfs();
    let _file = open(&vfs, "/named");

    assert_eq!(vfs.name(), "memdb");
    assert!(!vfs.access("/named", AccessFlags::Exists).unwrap());
    vfs.delete("/named-journal", false).unwrap();
    assert!(vfs.registry().contains("named"));
    assert_eq!(vfs.full_pathname("/named").unwrap(), "/named");
}

#[test]
fn test_size_hint_through_handle() {
    let vfs = setup_vfs();
    let file = open(&vfs, "/hint");
    file.write_at(&[1u8; 100], 0).unwrap();

    file.size_hint(10).unwrap();
    assert_eq!(file.size().unwrap(), 100);
    file.size_hint(4096).unwrap();
    assert_eq!(file.size().unwrap(), 4096);

    file.truncate(0).unwrap();
    assert_eq!(file.size().unwrap(), 0);
}
