//! CID/CSD/OCR register decoding.
//!
//! The card returns these registers as raw big-endian bit fields; the
//! layouts follow the Physical Spec. Bit offsets below count from the
//! most significant bit of the first byte, matching the order the bytes
//! arrive on the wire.

/// Extract `width` bits starting `offset` bits into `raw`, MSB first.
pub fn bit_field(raw: &[u8], offset: usize, width: usize) -> u32 {
    let mut value = 0u32;
    for i in 0..width {
        let bit = offset + i;
        let byte = raw[bit / 8];
        let b = (byte >> (7 - bit % 8)) & 1;
        value = (value << 1) | b as u32;
    }
    value
}

/// Card identification register (CMD10 answer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cid {
    /// Manufacturer ID
    pub mid: u8,
    /// OEM/application ID, two ASCII characters
    pub oid: u16,
    /// Product name, five ASCII characters
    pub pnm: [u8; 5],
    /// Product revision (BCD major.minor)
    pub prv: u8,
    /// Product serial number
    pub psn: u32,
    /// Manufacturing date, 12-bit year/month field
    pub mdt: u16,
}

impl Cid {
    pub fn parse(raw: &[u8; 16]) -> Self {
        let mut pnm = [0u8; 5];
        pnm.copy_from_slice(&raw[3..8]);
        Self {
            mid: bit_field(raw, 0, 8) as u8,
            oid: bit_field(raw, 8, 16) as u16,
            pnm,
            prv: bit_field(raw, 64, 8) as u8,
            psn: bit_field(raw, 72, 32),
            mdt: bit_field(raw, 108, 12) as u16,
        }
    }
}

/// Card-specific data register (CMD9 answer).
///
/// Both the v1.0 (standard capacity) and v2.0 (SDHC/SDXC) layouts are
/// understood; fields that exist only in v1.0 read as zero for v2.0
/// cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Csd {
    pub csd_structure: u8,
    pub taac: u8,
    pub nsac: u8,
    pub tran_speed: u8,
    pub ccc: u16,
    pub read_bl_len: u8,
    pub read_bl_partial: bool,
    pub write_blk_misalign: bool,
    pub read_blk_misalign: bool,
    pub dsr_imp: bool,
    pub c_size: u32,
    pub vdd_r_curr_min: u8,
    pub vdd_r_curr_max: u8,
    pub vdd_w_curr_min: u8,
    pub vdd_w_curr_max: u8,
    pub c_size_mult: u8,
    pub erase_blk_en: bool,
    pub sector_size: u8,
    pub wp_grp_size: u8,
    pub wp_grp_enable: bool,
    pub r2w_factor: u8,
    pub write_bl_len: u8,
    pub write_bl_partial: bool,
    pub file_format_grp: bool,
    pub copy: bool,
    pub perm_write_protect: bool,
    pub tmp_write_protect: bool,
    pub file_format: u8,
    pub crc: u8,
}

impl Csd {
    /// Decode a raw CSD. Returns `None` for structure versions other
    /// than 1.0 and 2.0.
    pub fn parse(raw: &[u8; 16]) -> Option<Self> {
        let csd_structure = bit_field(raw, 0, 2) as u8;
        if csd_structure > 1 {
            return None;
        }

        let mut csd = Self {
            csd_structure,
            taac: bit_field(raw, 8, 8) as u8,
            nsac: bit_field(raw, 16, 8) as u8,
            tran_speed: bit_field(raw, 24, 8) as u8,
            ccc: bit_field(raw, 32, 12) as u16,
            read_bl_len: bit_field(raw, 44, 4) as u8,
            read_bl_partial: bit_field(raw, 48, 1) != 0,
            write_blk_misalign: bit_field(raw, 49, 1) != 0,
            read_blk_misalign: bit_field(raw, 50, 1) != 0,
            dsr_imp: bit_field(raw, 51, 1) != 0,
            erase_blk_en: bit_field(raw, 81, 1) != 0,
            sector_size: bit_field(raw, 82, 7) as u8,
            wp_grp_size: bit_field(raw, 89, 7) as u8,
            wp_grp_enable: bit_field(raw, 96, 1) != 0,
            r2w_factor: bit_field(raw, 99, 3) as u8,
            write_bl_len: bit_field(raw, 102, 4) as u8,
            write_bl_partial: bit_field(raw, 106, 1) != 0,
            file_format_grp: bit_field(raw, 112, 1) != 0,
            copy: bit_field(raw, 113, 1) != 0,
            perm_write_protect: bit_field(raw, 114, 1) != 0,
            tmp_write_protect: bit_field(raw, 115, 1) != 0,
            file_format: bit_field(raw, 116, 2) as u8,
            crc: bit_field(raw, 120, 7) as u8,
            ..Self::default()
        };

        if csd_structure == 0 {
            csd.c_size = bit_field(raw, 54, 12);
            csd.vdd_r_curr_min = bit_field(raw, 66, 3) as u8;
            csd.vdd_r_curr_max = bit_field(raw, 69, 3) as u8;
            csd.vdd_w_curr_min = bit_field(raw, 72, 3) as u8;
            csd.vdd_w_curr_max = bit_field(raw, 75, 3) as u8;
            csd.c_size_mult = bit_field(raw, 78, 3) as u8;
        } else {
            csd.c_size = bit_field(raw, 58, 22);
        }

        Some(csd)
    }

    /// Card capacity in 512-byte sectors.
    pub fn capacity_sectors(&self) -> u32 {
        if self.csd_structure == 1 {
            // SDHC/SDXC: fixed 512 KiB granularity
            (self.c_size + 1) * 1024
        } else {
            // SDSC: BLOCKNR * BLOCK_LEN / 512
            let block_nr =
                (self.c_size as u64 + 1) << (self.c_size_mult as u64 + 2);
            let bytes = block_nr << self.read_bl_len as u64;
            (bytes / 512) as u32
        }
    }
}

/// Operating conditions register (CMD58 answer payload).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ocr {
    /// Power-up status (busy bit, set once initialization completes)
    pub busy: bool,
    /// Card capacity status; set for SDHC/SDXC
    pub ccs: bool,
    /// UHS-II card status
    pub uhs2: bool,
    /// Switching to 1.8V accepted
    pub s18a: bool,
    /// Voltage window, 3.5-3.6V down to 2.7-2.8V
    pub v35_36: bool,
    pub v34_35: bool,
    pub v33_34: bool,
    pub v32_33: bool,
    pub v31_32: bool,
    pub v30_31: bool,
    pub v29_30: bool,
    pub v28_29: bool,
    pub v27_28: bool,
}

impl Ocr {
    pub fn parse(raw: &[u8; 4]) -> Self {
        Self {
            busy: bit_field(raw, 0, 1) != 0,
            ccs: bit_field(raw, 1, 1) != 0,
            uhs2: bit_field(raw, 2, 1) != 0,
            s18a: bit_field(raw, 7, 1) != 0,
            v35_36: bit_field(raw, 8, 1) != 0,
            v34_35: bit_field(raw, 9, 1) != 0,
            v33_34: bit_field(raw, 10, 1) != 0,
            v32_33: bit_field(raw, 11, 1) != 0,
            v31_32: bit_field(raw, 12, 1) != 0,
            v30_31: bit_field(raw, 13, 1) != 0,
            v29_30: bit_field(raw, 14, 1) != 0,
            v28_29: bit_field(raw, 15, 1) != 0,
            v27_28: bit_field(raw, 16, 1) != 0,
        }
    }
}
