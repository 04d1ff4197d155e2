//! # System Description Tables

use crate::rsdp::AcpiRoots;
use crate::PhysMapRo;
use boot_error::{Error, Result};
use core::slice::ChunksExact;
use log::debug;

/// Common header of every SDT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdtHeader {
    pub signature: [u8; 4],
    /// Length of the whole table, header included.
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl SdtHeader {
    pub const SIZE: usize = 36;

    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let b = bytes.get(..Self::SIZE)?;
        let u32_at = |at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]);
        let mut header = Self {
            signature: [0; 4],
            length: u32_at(4),
            revision: b[8],
            checksum: b[9],
            oem_id: [0; 6],
            oem_table_id: [0; 8],
            oem_revision: u32_at(24),
            creator_id: u32_at(28),
            creator_revision: u32_at(32),
        };
        header.signature.copy_from_slice(&b[..4]);
        header.oem_id.copy_from_slice(&b[10..16]);
        header.oem_table_id.copy_from_slice(&b[16..24]);
        Some(header)
    }

    /// Signature comparison only; checksums are not looked at.
    #[must_use]
    pub fn matches(&self, signature: &[u8; 4]) -> bool {
        &self.signature == signature
    }
}

/// A table located in firmware memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sdt {
    pub addr: u64,
    pub header: SdtHeader,
}

impl Sdt {
    /// The whole table, header included.
    ///
    /// # Safety
    /// The table must still be mapped.
    pub unsafe fn bytes<'a>(&self, map: &impl PhysMapRo) -> &'a [u8] {
        unsafe { map.map_ro(self.addr, self.header.length as usize) }
    }
}

/// Raw entries of an RSDT or XSDT.
pub struct SdtEntries<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for SdtEntries<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let chunk = self.chunks.next()?;
        let mut raw = [0u8; 8];
        raw[..chunk.len()].copy_from_slice(chunk);
        Some(u64::from_le_bytes(raw))
    }
}

/// Walker over the RSDT or XSDT entry array.
///
/// Invariant: `tab_end - tab` is a multiple of `entry_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcpiTables {
    root: u64,
    tab: u64,
    tab_end: u64,
    entry_size: usize,
}

impl AcpiTables {
    /// # Errors
    /// See [`AcpiRoots::parse`] and [`AcpiTables::from_roots`].
    ///
    /// # Safety
    /// The RSDP and the root table must be readable through `map`.
    pub unsafe fn from_rsdp(map: &impl PhysMapRo, rsdp_addr: u64) -> Result<Self> {
        let roots = unsafe { AcpiRoots::parse(map, rsdp_addr) }?;
        unsafe { Self::from_roots(map, &roots) }
    }

    /// Prefer the XSDT when present, else fall back to the RSDT.
    ///
    /// # Errors
    /// [`Error::NotFound`] if neither root table exists,
    /// [`Error::BadHeader`] if its length is shorter than a header.
    ///
    /// # Safety
    /// The root table must be readable through `map`.
    pub unsafe fn from_roots(map: &impl PhysMapRo, roots: &AcpiRoots) -> Result<Self> {
        let (root, entry_size, name) = match (roots.xsdt_addr, roots.rsdt_addr) {
            (Some(xsdt), _) => (xsdt, 8, "XSDT"),
            (None, Some(rsdt)) => (rsdt, 4, "RSDT"),
            (None, None) => return Err(Error::NotFound),
        };

        let header = SdtHeader::parse(unsafe { map.map_ro(root, SdtHeader::SIZE) })
            .ok_or(Error::BadHeader)?;
        let length = u64::from(header.length);
        let body = length
            .checked_sub(SdtHeader::SIZE as u64)
            .ok_or(Error::BadHeader)?;

        let tab = root + SdtHeader::SIZE as u64;
        let tab_end = tab + body - body % entry_size as u64;
        debug!("{name} @ {root:#x}-{:#x}", root + length);

        Ok(Self {
            root,
            tab,
            tab_end,
            entry_size,
        })
    }

    /// Address of the RSDT or XSDT itself.
    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// 4 for an RSDT, 8 for an XSDT.
    #[must_use]
    pub const fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Number of entries, NULL entries included.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn len(&self) -> usize {
        (self.tab_end - self.tab) as usize / self.entry_size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tab_end == self.tab
    }

    /// Raw table pointers in entry order.
    ///
    /// # Safety
    /// The entry array must be readable through `map`.
    #[allow(clippy::cast_possible_truncation)]
    pub unsafe fn entries<'a>(self, map: &impl PhysMapRo) -> SdtEntries<'a> {
        let array = unsafe { map.map_ro(self.tab, (self.tab_end - self.tab) as usize) };
        SdtEntries {
            chunks: array.chunks_exact(self.entry_size),
        }
    }

    /// Every table referenced by a non-NULL entry.
    ///
    /// # Safety
    /// The entry array and the table headers must be readable through
    /// `map`.
    pub unsafe fn tables<M: PhysMapRo>(self, map: &M) -> impl Iterator<Item = Sdt> + '_ {
        unsafe { self.entries(map) }.filter_map(move |addr| {
            if addr == 0 {
                debug!("NULL SDT entry detected");
                return None;
            }
            let header = SdtHeader::parse(unsafe { map.map_ro(addr, SdtHeader::SIZE) })?;
            Some(Sdt { addr, header })
        })
    }

    /// First table with `signature`.
    ///
    /// # Safety
    /// See [`AcpiTables::tables`].
    pub unsafe fn find_sdt(self, map: &impl PhysMapRo, signature: &[u8; 4]) -> Option<Sdt> {
        unsafe { self.tables(map) }.find(|sdt| sdt.header.matches(signature))
    }
}
