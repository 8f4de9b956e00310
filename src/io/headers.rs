//! Binary container headers shared with the ingest and output writers.
//! Collaborating tools validate these before touching any payload; the
//! field layout is fixed and all multi-byte integers are little-endian.

use anyhow::{bail, ensure, Result};
use std::io::{Read, Write};

pub const MAGIC_LENGTH: usize = 8;
/// Genotype container magic.
pub const GENOTYPE_MAGIC: [u8; MAGIC_LENGTH] = *b"CRWGENO\x01";
/// LD output magic.
pub const LD_MAGIC: [u8; MAGIC_LENGTH] = *b"CRWLDOUT";

pub const PROGRAM_VERSION_MAJOR: f32 = 0.4;
pub const PROGRAM_VERSION_MINOR: f32 = 1.0;

/// Controller bit marking a globally sorted output.
pub const CONTROLLER_SORTED: u8 = 1;

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    Ok(f32::from_le_bytes(read_array::<R, 4>(reader)?))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array::<R, 8>(reader)?))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array::<R, 4>(reader)?))
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    Ok(u16::from_le_bytes(read_array::<R, 2>(reader)?))
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    Ok(read_array::<R, 1>(reader)?[0])
}

/**
 * Leading header of a genotype container: magic, writer version, panel
 * shape and a controller bitfield reserved for the writer.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerHeader {
    pub major_version: f32,
    pub minor_version: f32,
    pub n_samples: u64,
    pub n_contigs: u32,
    pub controller: u16,
}

impl ContainerHeader {
    pub fn new(n_samples: u64, n_contigs: u32) -> ContainerHeader {
        ContainerHeader {
            major_version: PROGRAM_VERSION_MAJOR,
            minor_version: PROGRAM_VERSION_MINOR,
            n_samples,
            n_contigs,
            controller: 0,
        }
    }

    pub fn validate(&self) -> bool {
        self.n_samples > 0 && self.n_contigs > 0
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&GENOTYPE_MAGIC)?;
        writer.write_all(&self.major_version.to_le_bytes())?;
        writer.write_all(&self.minor_version.to_le_bytes())?;
        writer.write_all(&self.n_samples.to_le_bytes())?;
        writer.write_all(&self.n_contigs.to_le_bytes())?;
        writer.write_all(&self.controller.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<ContainerHeader> {
        let magic = read_array::<R, MAGIC_LENGTH>(reader)?;
        if magic != GENOTYPE_MAGIC {
            bail!("Not a genotype container: bad magic {:?}", magic);
        }
        let header = ContainerHeader {
            major_version: read_f32(reader)?,
            minor_version: read_f32(reader)?,
            n_samples: read_u64(reader)?,
            n_contigs: read_u32(reader)?,
            controller: read_u16(reader)?,
        };
        ensure!(
            header.validate(),
            "Genotype container declares an empty panel ({} samples, {} contigs)",
            header.n_samples,
            header.n_contigs
        );
        Ok(header)
    }
}

/// Header of an LD output stream; same shape as the container header under
/// a distinct magic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LdOutputHeader {
    pub major_version: f32,
    pub minor_version: f32,
    pub n_samples: u64,
    pub n_contigs: u32,
    pub controller: u16,
}

impl LdOutputHeader {
    pub fn new(n_samples: u64, n_contigs: u32) -> LdOutputHeader {
        LdOutputHeader {
            major_version: PROGRAM_VERSION_MAJOR,
            minor_version: PROGRAM_VERSION_MINOR,
            n_samples,
            n_contigs,
            controller: 0,
        }
    }

    pub fn validate(&self) -> bool {
        self.n_samples > 0 && self.n_contigs > 0
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&LD_MAGIC)?;
        writer.write_all(&self.major_version.to_le_bytes())?;
        writer.write_all(&self.minor_version.to_le_bytes())?;
        writer.write_all(&self.n_samples.to_le_bytes())?;
        writer.write_all(&self.n_contigs.to_le_bytes())?;
        writer.write_all(&self.controller.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<LdOutputHeader> {
        let magic = read_array::<R, MAGIC_LENGTH>(reader)?;
        if magic != LD_MAGIC {
            bail!("Not an LD output stream: bad magic {:?}", magic);
        }
        let header = LdOutputHeader {
            major_version: read_f32(reader)?,
            minor_version: read_f32(reader)?,
            n_samples: read_u64(reader)?,
            n_contigs: read_u32(reader)?,
            controller: read_u16(reader)?,
        };
        ensure!(
            header.validate(),
            "LD output declares an empty panel ({} samples, {} contigs)",
            header.n_samples,
            header.n_contigs
        );
        Ok(header)
    }
}

/**
 * Header of a sorted LD output. Extends the output header with an entry
 * count and one controller byte whose low bit records whether the entries
 * are globally sorted rather than merely sorted per slice.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortedLdHeader {
    pub header: LdOutputHeader,
    pub n_entries: u32,
    pub controller: u8,
}

impl SortedLdHeader {
    pub fn new(n_samples: u64, n_contigs: u32) -> SortedLdHeader {
        SortedLdHeader {
            header: LdOutputHeader::new(n_samples, n_contigs),
            n_entries: 0,
            controller: 0,
        }
    }

    pub fn set_sorted(&mut self, sorted: bool) {
        if sorted {
            self.controller |= CONTROLLER_SORTED;
        } else {
            self.controller &= !CONTROLLER_SORTED;
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.controller & CONTROLLER_SORTED != 0
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.header.write_to(writer)?;
        writer.write_all(&self.n_entries.to_le_bytes())?;
        writer.write_all(&[self.controller])?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<SortedLdHeader> {
        let header = LdOutputHeader::read_from(reader)?;
        Ok(SortedLdHeader {
            header,
            n_entries: read_u32(reader)?,
            controller: read_u8(reader)?,
        })
    }
}
