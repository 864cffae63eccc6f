// byte_order.rs -- byte-order aware reading and writing of level data
//
// Everything that touches raw file bytes goes through `BspReader` or the
// `put_*` helpers; decoded structures are always in host order.

use crate::error::{CmResult, CollisionError};
use crate::q_shared::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[inline]
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn u32_to(self, v: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }
}

/// Cursor over a byte slice that decodes fixed-width fields in a given
/// byte order. Reads past the end are format errors, never panics.
#[derive(Debug, Clone)]
pub struct BspReader<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> BspReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CmResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                CollisionError::format(format!(
                    "read of {} bytes at offset {} overruns {} byte buffer",
                    n,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take4(&mut self) -> CmResult<[u8; 4]> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    pub fn read_u32(&mut self) -> CmResult<u32> {
        let bytes = self.take4()?;
        Ok(self.order.u32_from(bytes))
    }

    pub fn read_i32(&mut self) -> CmResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> CmResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_vec3(&mut self) -> CmResult<Vec3> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_i32x3(&mut self) -> CmResult<[i32; 3]> {
        Ok([self.read_i32()?, self.read_i32()?, self.read_i32()?])
    }

    pub fn read_bytes(&mut self, n: usize) -> CmResult<&'a [u8]> {
        self.take(n)
    }
}

pub fn put_u32(out: &mut Vec<u8>, v: u32, order: ByteOrder) {
    out.extend_from_slice(&order.u32_to(v));
}

pub fn put_i32(out: &mut Vec<u8>, v: i32, order: ByteOrder) {
    put_u32(out, v as u32, order);
}

pub fn put_f32(out: &mut Vec<u8>, v: f32, order: ByteOrder) {
    put_u32(out, v.to_bits(), order);
}

pub fn put_vec3(out: &mut Vec<u8>, v: &Vec3, order: ByteOrder) {
    for &c in v {
        put_f32(out, c, order);
    }
}

/// Writes `s` into a fixed-size, NUL padded field (truncating if needed).
pub fn put_fixed_str(out: &mut Vec<u8>, s: &str, len: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(len.saturating_sub(1));
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (len - n), 0);
}

/// Reads a NUL terminated string out of a fixed-size field.
pub fn fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
