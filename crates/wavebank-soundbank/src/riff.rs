//! Minimal little-endian RIFF reader.
//!
//! Chunks borrow from the file image. Reads are bounds-checked against the
//! declared chunk length and fail with [`Error::ChunkOverrun`].

use crate::error::{Error, Result};

/// FourCC as text, for logs and errors.
pub fn fourcc_str(id: &[u8; 4]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

/// One RIFF chunk.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub id: [u8; 4],
    pub data: &'a [u8],
}

impl<'a> Chunk<'a> {
    #[inline]
    pub fn is(&self, id: &[u8; 4]) -> bool {
        &self.id == id
    }

    pub fn name(&self) -> String {
        fourcc_str(&self.id)
    }

    /// Cursor over the chunk payload.
    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.name(), self.data)
    }

    /// For `RIFF` and `LIST` chunks: the form type and the sub-chunks.
    pub fn list(&self) -> Result<(String, Vec<Chunk<'a>>)> {
        let mut reader = self.reader();
        let kind = reader.read_fourcc()?;
        let mut children = Vec::new();
        while reader.remaining() >= 8 {
            children.push(reader.read_chunk()?);
        }
        Ok((fourcc_str(&kind), children))
    }

    /// Like [`Chunk::list`], checking the form type.
    pub fn expect_list(&self, expected: &str) -> Result<Vec<Chunk<'a>>> {
        let (kind, children) = self.list()?;
        if !kind.eq_ignore_ascii_case(expected) {
            return Err(Error::UnexpectedChunk {
                expected: expected.to_string(),
                found: kind,
            });
        }
        Ok(children)
    }
}

/// Bounds-checked cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    name: String,
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(name: impl Into<String>, data: &'a [u8]) -> Self {
        Self {
            name: name.into(),
            data,
            pos: 0,
        }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::ChunkOverrun {
                chunk: self.name.clone(),
                needed: len,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_fourcc(&mut self) -> Result<[u8; 4]> {
        self.read_array()
    }

    /// Fixed-width, NUL-padded string.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).trim_end().to_string())
    }

    /// Read a chunk header and payload, consuming the pad byte of odd sizes.
    pub fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let id = self.read_fourcc()?;
        let size = self.read_u32()? as usize;
        let data = self.read_bytes(size).map_err(|e| match e {
            Error::ChunkOverrun { needed, available, .. } => Error::ChunkOverrun {
                chunk: fourcc_str(&id),
                needed,
                available,
            },
            other => other,
        })?;
        if size % 2 == 1 && self.remaining() > 0 {
            self.pos += 1;
        }
        Ok(Chunk { id, data })
    }
}
