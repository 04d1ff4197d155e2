//! # Structure Table

/// Type of the end-of-table structure.
pub const END_OF_TABLE: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureHeader {
    pub ty: u8,
    /// Length of the formatted area, header included.
    pub length: u8,
    pub handle: u16,
}

/// One structure: formatted area plus string set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure<'a> {
    pub header: StructureHeader,
    formatted: &'a [u8],
    strings: &'a [u8],
}

impl<'a> Structure<'a> {
    /// Formatted area, header included.
    #[must_use]
    pub const fn formatted(&self) -> &'a [u8] {
        self.formatted
    }

    /// Byte at `offset` of the formatted area.
    #[must_use]
    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.formatted.get(offset).copied()
    }

    /// String number `index`, counted from 1.
    #[must_use]
    pub fn string(&self, index: u8) -> Option<&'a str> {
        if index == 0 {
            return None;
        }
        let s = self
            .strings
            .split(|&b| b == 0)
            .take_while(|s| !s.is_empty())
            .nth(usize::from(index) - 1)?;
        core::str::from_utf8(s).ok()
    }

    /// The string referenced by the byte at `offset`.
    #[must_use]
    pub fn string_at(&self, offset: usize) -> Option<&'a str> {
        self.string(self.byte(offset)?)
    }
}

/// A structure table in memory.
#[derive(Debug, Clone, Copy)]
pub struct SmbiosTable<'a> {
    bytes: &'a [u8],
}

impl<'a> SmbiosTable<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// All structures, stopping at the end-of-table structure or at the
    /// end of the bytes, whichever comes first.
    #[must_use]
    pub const fn structures(&self) -> Structures<'a> {
        Structures {
            rest: self.bytes,
            done: false,
        }
    }

    /// First structure of type `ty`.
    #[must_use]
    pub fn get_struct(&self, ty: u8) -> Option<Structure<'a>> {
        self.structures().find(|s| s.header.ty == ty)
    }
}

pub struct Structures<'a> {
    rest: &'a [u8],
    done: bool,
}

impl<'a> Iterator for Structures<'a> {
    type Item = Structure<'a>;

    fn next(&mut self) -> Option<Structure<'a>> {
        if self.done || self.rest.len() < 4 {
            return None;
        }
        let header = StructureHeader {
            ty: self.rest[0],
            length: self.rest[1],
            handle: u16::from_le_bytes([self.rest[2], self.rest[3]]),
        };
        let length = usize::from(header.length);
        if length < 4 || length > self.rest.len() {
            self.done = true;
            return None;
        }

        let (formatted, tail) = self.rest.split_at(length);
        // String set ends at the first double NUL; a truncated set runs to
        // the end of the table.
        let end = tail
            .windows(2)
            .position(|w| w == [0, 0])
            .map_or(tail.len(), |i| i + 2);
        let (strings, rest) = tail.split_at(end);

        self.rest = rest;
        self.done = header.ty == END_OF_TABLE;
        Some(Structure {
            header,
            formatted,
            strings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_without_strings() {
        let raw = b"\x20\x05\x10\x00\x07\0\0\x01\x06\x11\x00\x00\x01Foo\0\0";
        let table = SmbiosTable::new(raw);
        let kinds: Vec<u8> = table.structures().map(|s| s.header.ty).collect();
        assert_eq!(kinds, [0x20, 0x01]);

        let first = table.get_struct(0x20).unwrap();
        assert_eq!(first.byte(4), Some(7));
        assert_eq!(first.string(1), None);

        let system = table.get_struct(1).unwrap();
        assert_eq!(system.header.handle, 0x11);
        assert_eq!(system.string_at(4), None);
        assert_eq!(system.string_at(5), Some("Foo"));
    }

    #[test]
    fn end_of_table_stops_the_walk() {
        let raw = b"\x7f\x04\x00\x00\0\0\x01\x04\x01\x00\0\0";
        let table = SmbiosTable::new(raw);
        assert_eq!(table.structures().count(), 1);
        assert!(table.get_struct(1).is_none());
    }

    #[test]
    fn malformed_length_ends_iteration() {
        let raw = b"\x01\x02\x00\x00\0\0";
        assert_eq!(SmbiosTable::new(raw).structures().count(), 0);
        let raw = b"\x01\x40\x00\x00\0\0";
        assert_eq!(SmbiosTable::new(raw).structures().count(), 0);
    }
}
