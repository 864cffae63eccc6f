// bsp_writer.rs -- assembles level files from lump records
//
// Used by tools that generate levels and by the test fixtures.

use crate::byte_order::{put_i32, ByteOrder};
use crate::qfiles::{
    DHeader, DiskRecord, Lump, BSP_BYTE_ORDER, BSP_IDENT, BSP_VERSION, HEADER_LUMPS,
    HEADER_SIZE, LUMP_ENTITIES, LUMP_VISIBILITY,
};

#[derive(Debug, Clone)]
pub struct BspWriter {
    ident: i32,
    version: i32,
    order: ByteOrder,
    lumps: Vec<Vec<u8>>,
}

impl Default for BspWriter {
    fn default() -> Self {
        Self {
            ident: BSP_IDENT,
            version: BSP_VERSION,
            order: BSP_BYTE_ORDER,
            lumps: vec![Vec::new(); HEADER_LUMPS],
        }
    }
}

impl BspWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&mut self, version: i32) -> &mut Self {
        self.version = version;
        self
    }

    /// Replaces lump `lump` with the encoded `records`.
    pub fn records<T: DiskRecord>(&mut self, lump: usize, records: &[T]) -> &mut Self {
        let mut out = Vec::with_capacity(records.len() * T::SIZE);
        for r in records {
            r.write(&mut out, self.order);
        }
        self.lumps[lump] = out;
        self
    }

    /// Entity text, NUL terminated as the map compiler writes it.
    pub fn entities(&mut self, text: &str) -> &mut Self {
        let mut out = text.as_bytes().to_vec();
        out.push(0);
        self.lumps[LUMP_ENTITIES] = out;
        self
    }

    /// Visibility header followed by the raw rows. An all-zero header with no
    /// rows leaves the lump empty.
    pub fn visibility(&mut self, num_clusters: i32, cluster_bytes: i32, rows: &[u8]) -> &mut Self {
        let mut out = Vec::with_capacity(8 + rows.len());
        if num_clusters != 0 || cluster_bytes != 0 || !rows.is_empty() {
            put_i32(&mut out, num_clusters, self.order);
            put_i32(&mut out, cluster_bytes, self.order);
            out.extend_from_slice(rows);
        }
        self.lumps[LUMP_VISIBILITY] = out;
        self
    }

    /// Header and lumps, each lump starting on a 4 byte boundary.
    pub fn finish(&self) -> Vec<u8> {
        let mut body = Vec::new();
        let mut header = DHeader {
            ident: self.ident,
            version: self.version,
            lumps: [Lump::default(); HEADER_LUMPS],
        };

        for (lump, data) in header.lumps.iter_mut().zip(&self.lumps) {
            lump.fileofs = (HEADER_SIZE + body.len()) as i32;
            lump.filelen = data.len() as i32;
            body.extend_from_slice(data);
            body.resize((body.len() + 3) & !3, 0);
        }

        let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
        header.write(&mut out, self.order);
        out.extend_from_slice(&body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_order::BspReader;
    use crate::qfiles::{DPlane, LUMP_PLANES, LUMP_SHADERS};

    #[test]
    fn header_points_at_lumps() {
        let planes = [
            DPlane { normal: [1.0, 0.0, 0.0], dist: 8.0 },
            DPlane { normal: [0.0, 1.0, 0.0], dist: -8.0 },
        ];
        let bytes = BspWriter::new()
            .records(LUMP_PLANES, &planes)
            .entities("{}")
            .finish();

        let mut r = BspReader::new(&bytes, BSP_BYTE_ORDER);
        assert_eq!(DHeader::read_version(&mut r).unwrap(), (BSP_IDENT, BSP_VERSION));
        let lumps = DHeader::read_lumps(&mut r).unwrap();

        let ents = lumps[LUMP_ENTITIES];
        assert_eq!(ents.fileofs as usize, HEADER_SIZE);
        assert_eq!(ents.filelen, 3);

        let pl = lumps[LUMP_PLANES];
        assert_eq!(pl.fileofs % 4, 0);
        assert_eq!(pl.filelen, 32);
        let mut pr = BspReader::new(&bytes[pl.fileofs as usize..], BSP_BYTE_ORDER);
        assert_eq!(DPlane::read(&mut pr).unwrap(), planes[0]);
        assert_eq!(DPlane::read(&mut pr).unwrap(), planes[1]);

        assert_eq!(lumps[LUMP_SHADERS].filelen, 0);
    }

    #[test]
    fn default_header_is_ibsp_47() {
        let bytes = BspWriter::new().finish();
        assert_eq!(&bytes[..4], b"IBSP");
        assert_eq!(&bytes[4..8], &47i32.to_le_bytes());
    }

    #[test]
    fn version_override() {
        let bytes = BspWriter::new().set_version(38).finish();
        assert_eq!(&bytes[4..8], &38i32.to_le_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE);
    }
}
