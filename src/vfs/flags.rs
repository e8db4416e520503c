//! Engine flag types
//!
//! Numeric values match the hosting engine's C constants.

use bitflags::bitflags;

bitflags! {
    /// Flags passed to `Vfs::open` and returned with the opened file
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READONLY       = 0x0000_0001;
        const READWRITE      = 0x0000_0002;
        const CREATE         = 0x0000_0004;
        const DELETEONCLOSE  = 0x0000_0008;
        const EXCLUSIVE      = 0x0000_0010;
        const URI            = 0x0000_0040;
        const MEMORY         = 0x0000_0080;
        const MAIN_DB        = 0x0000_0100;
        const TEMP_DB        = 0x0000_0200;
        const TRANSIENT_DB   = 0x0000_0400;
        const MAIN_JOURNAL   = 0x0000_0800;
        const TEMP_JOURNAL   = 0x0000_1000;
        const SUBJOURNAL     = 0x0000_2000;
        const SUPER_JOURNAL  = 0x0000_4000;
        const NOMUTEX        = 0x0000_8000;
        const FULLMUTEX      = 0x0001_0000;
        const SHAREDCACHE    = 0x0002_0000;
        const PRIVATECACHE   = 0x0004_0000;
        const WAL            = 0x0008_0000;
        const NOFOLLOW       = 0x0100_0000;
    }
}

impl OpenFlags {
    /// File kinds this backend serves; every access to them is block-aligned
    pub const SUPPORTED_KINDS: OpenFlags = OpenFlags::MAIN_DB
        .union(OpenFlags::TEMP_DB)
        .union(OpenFlags::TEMP_JOURNAL);
}

bitflags! {
    /// Flags passed to `VfsFile::sync`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyncFlags: u32 {
        const NORMAL   = 0x0000_0002;
        const FULL     = 0x0000_0003;
        const DATAONLY = 0x0000_0010;
    }
}

bitflags! {
    /// Device characteristics reported by `VfsFile::device_characteristics`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceCharacteristics: u32 {
        const ATOMIC                = 0x0000_0001;
        const ATOMIC512             = 0x0000_0002;
        const ATOMIC1K              = 0x0000_0004;
        const ATOMIC2K              = 0x0000_0008;
        const ATOMIC4K              = 0x0000_0010;
        const ATOMIC8K              = 0x0000_0020;
        const ATOMIC16K             = 0x0000_0040;
        const ATOMIC32K             = 0x0000_0080;
        const ATOMIC64K             = 0x0000_0100;
        const SAFE_APPEND           = 0x0000_0200;
        const SEQUENTIAL            = 0x0000_0400;
        const UNDELETABLE_WHEN_OPEN = 0x0000_0800;
        const POWERSAFE_OVERWRITE   = 0x0000_1000;
        const IMMUTABLE             = 0x0000_2000;
        const BATCH_ATOMIC          = 0x0000_4000;
    }
}

/// Check requested by `Vfs::access`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AccessFlags {
    Exists = 0,
    ReadWrite = 1,
    Read = 2,
}
