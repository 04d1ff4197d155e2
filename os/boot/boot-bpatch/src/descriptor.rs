//! # Patch Descriptors
//!
//! One record of `.bpatch_array`, packed, little-endian:
//!
//! ```text
//! 0x00 u32  type (1 function, 2 zone, 3 data)
//! 0x04 u8   is_applied
//! 0x05 u8[3]
//! 0x08 u64  target           function start, patched zone or variable
//! 0x10 u64  replacement      function patches only
//! 0x18 u64  patch_location   written back once applied
//! 0x20 u64  new_value        data patches; zone opcode in bytes 0x24..0x28
//! 0x28 u32  write_size
//! 0x2c u32  patch_group_id
//! ```

/// What a descriptor rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PatchType {
    /// Redirect a function through its patchable preamble.
    Function = 1,
    /// Replace one instruction.
    Zone = 2,
    /// Overwrite up to 8 bytes of data.
    Data = 3,
}

impl PatchType {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Function),
            2 => Some(Self::Zone),
            3 => Some(Self::Data),
            _ => None,
        }
    }
}

/// Decoded copy of a `.bpatch_array` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryPatch {
    /// Raw type; see [`PatchType::from_raw`].
    pub kind: u32,
    pub is_applied: bool,
    pub target: u64,
    pub replacement: u64,
    pub patch_location: u64,
    pub new_value: u64,
    pub write_size: u32,
    pub group: u32,
}

impl BinaryPatch {
    pub const SIZE: usize = 48;

    #[must_use]
    pub fn from_bytes(b: &[u8; Self::SIZE]) -> Self {
        let u32_at = |at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]);
        let u64_at = |at: usize| u64::from(u32_at(at)) | (u64::from(u32_at(at + 4)) << 32);
        Self {
            kind: u32_at(0x00),
            is_applied: b[0x04] != 0,
            target: u64_at(0x08),
            replacement: u64_at(0x10),
            patch_location: u64_at(0x18),
            new_value: u64_at(0x20),
            write_size: u32_at(0x28),
            group: u32_at(0x2c),
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut b = [0u8; Self::SIZE];
        b[0x00..0x04].copy_from_slice(&self.kind.to_le_bytes());
        b[0x04] = u8::from(self.is_applied);
        b[0x08..0x10].copy_from_slice(&self.target.to_le_bytes());
        b[0x10..0x18].copy_from_slice(&self.replacement.to_le_bytes());
        b[0x18..0x20].copy_from_slice(&self.patch_location.to_le_bytes());
        b[0x20..0x28].copy_from_slice(&self.new_value.to_le_bytes());
        b[0x28..0x2c].copy_from_slice(&self.write_size.to_le_bytes());
        b[0x2c..0x30].copy_from_slice(&self.group.to_le_bytes());
        b
    }

    #[must_use]
    pub const fn patch_type(&self) -> Option<PatchType> {
        PatchType::from_raw(self.kind)
    }

    /// Instruction of a zone patch: the upper half of `new_value`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn opcode(&self) -> u32 {
        (self.new_value >> 32) as u32
    }

    /// A zone patch writing `opcode` at `target`.
    #[must_use]
    pub fn zone(target: u64, opcode: u32, group: u32) -> Self {
        Self {
            kind: PatchType::Zone as u32,
            target,
            new_value: u64::from(opcode) << 32,
            write_size: 4,
            group,
            ..Self::default()
        }
    }

    /// A data patch storing the low `write_size` bytes of `value` at `target`.
    #[must_use]
    pub fn data(target: u64, value: u64, write_size: u32, group: u32) -> Self {
        Self {
            kind: PatchType::Data as u32,
            target,
            new_value: value,
            write_size,
            group,
            ..Self::default()
        }
    }

    /// A function patch redirecting `target` to `replacement`.
    #[must_use]
    pub fn function(target: u64, replacement: u64, group: u32) -> Self {
        Self {
            kind: PatchType::Function as u32,
            target,
            replacement,
            write_size: 4,
            group,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_lives_in_upper_half() {
        let patch = BinaryPatch::zone(0x1000, 0xd503_201f, 3);
        let bytes = patch.to_bytes();
        assert_eq!(&bytes[0x20..0x24], &[0, 0, 0, 0]);
        assert_eq!(&bytes[0x24..0x28], &0xd503_201f_u32.to_le_bytes());
        assert_eq!(BinaryPatch::from_bytes(&bytes).opcode(), 0xd503_201f);
    }

    #[test]
    fn field_offsets() {
        let mut bytes = [0u8; BinaryPatch::SIZE];
        bytes[0] = 3;
        bytes[4] = 1;
        bytes[0x08] = 0x10;
        bytes[0x28] = 4;
        bytes[0x2c] = 9;
        let patch = BinaryPatch::from_bytes(&bytes);
        assert_eq!(patch.patch_type(), Some(PatchType::Data));
        assert!(patch.is_applied);
        assert_eq!(patch.target, 0x10);
        assert_eq!(patch.write_size, 4);
        assert_eq!(patch.group, 9);
        assert_eq!(PatchType::from_raw(0), None);
    }
}
