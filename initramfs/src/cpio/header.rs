//! The "newc" CPIO header.

/// Magic of the "newc" (new portable ASCII, no checksum) format.
pub const MAGIC: &str = "070701";

/// Length of an encoded header, magic included.
pub const HEADER_LEN: u64 = 110;

/// Name of the record terminating every archive.
pub const TRAILER_NAME: &str = "TRAILER!!!";

/// Alignment of names and bodies.
pub const ALIGNMENT: u64 = 4;

/// File type mask of a mode.
pub const S_IFMT: u32 = 0o170_000;
/// File type bits of a directory.
pub const S_IFDIR: u32 = 0o040_000;
/// File type bits of a regular file.
pub const S_IFREG: u32 = 0o100_000;
/// File type bits of a symbolic link.
pub const S_IFLNK: u32 = 0o120_000;

/// Permission bits of a mode, including setuid, setgid and sticky.
pub const PERM_MASK: u32 = 0o7777;

/// Returns the number of zero bytes needed to align `offset`.
///
/// # Examples
///
/// ```
/// use initramfs::cpio::header::padding;
///
/// assert_eq!(padding(0), 0);
/// assert_eq!(padding(5), 3);
/// assert_eq!(padding(112), 0);
/// ```
#[must_use]
pub fn padding(offset: u64) -> u64 {
    (ALIGNMENT - (offset & (ALIGNMENT - 1))) % ALIGNMENT
}

/// Header fields of one archive record.
///
/// Every field is encoded as eight uppercase hexadecimal digits. The name
/// size and checksum are derived while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Inode number, unique per record within an archive.
    pub ino: u32,
    /// File type and permission bits.
    pub mode: u32,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Hard link count.
    pub nlink: u32,
    /// Modification time in seconds since the epoch.
    pub mtime: u32,
    /// Body length in bytes.
    pub filesize: u32,
    /// Major number of the containing device.
    pub dev_major: u32,
    /// Minor number of the containing device.
    pub dev_minor: u32,
    /// Major number of a device special file.
    pub rdev_major: u32,
    /// Minor number of a device special file.
    pub rdev_minor: u32,
}

impl Header {
    /// Encodes the header followed by `name`, its NUL terminator and the
    /// padding that aligns the body.
    ///
    /// `offset` is the position in the archive where the header starts.
    #[must_use]
    pub fn encode(&self, name: &str, offset: u64) -> Vec<u8> {
        let namesize = name.len() + 1;
        let fields = format!(
            "{MAGIC}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}{:08X}",
            self.ino,
            self.mode,
            self.uid,
            self.gid,
            self.nlink,
            self.mtime,
            self.filesize,
            self.dev_major,
            self.dev_minor,
            self.rdev_major,
            self.rdev_minor,
            namesize,
            0,
        );

        let unpadded = HEADER_LEN + namesize as u64;
        let pad = padding(offset + unpadded) as usize;

        let mut buf = Vec::with_capacity(fields.len() + namesize + pad);
        buf.extend_from_slice(fields.as_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
        buf.resize(buf.len() + pad, 0);
        buf
    }
}
