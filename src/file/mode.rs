//! File open mode flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Flag set passed to [`open`](super::FrameFileWriter::open).
///
/// One access bit (`READ`, `WRITE` or `APPEND`) optionally combined with
/// `MULTIPLE` to store more than one frame per file.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileOpenMode(u8);

impl FileOpenMode {
    pub const READ: Self = Self(0x01);
    pub const WRITE: Self = Self(0x02);
    pub const APPEND: Self = Self(0x04);
    pub const MULTIPLE: Self = Self(0x08);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::READ, "READ"),
        (Self::WRITE, "WRITE"),
        (Self::APPEND, "APPEND"),
        (Self::MULTIPLE, "MULTIPLE"),
    ];

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// True if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FileOpenMode {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for FileOpenMode {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for FileOpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FileOpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileOpenMode({})", self)
    }
}
