//! Low-level wire buffer used by the message codec
//!
//! Messages are always built and inspected through the `PacketBuffer` trait
//! rather than through raw slices, so encoding and decoding code reads the
//! same regardless of where the bytes came from.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum BufferError {
    EndOfBuffer,
    LabelTooLong,
}

type Result<T> = std::result::Result<T, BufferError>;

pub trait PacketBuffer {
    fn read(&mut self) -> Result<u8>;
    fn write(&mut self, val: u8) -> Result<()>;
    fn seek(&mut self, pos: usize) -> Result<()>;

    fn read_u16(&mut self) -> Result<u16> {
        let res = ((self.read()? as u16) << 8) | (self.read()? as u16);
        Ok(res)
    }

    fn write_u8(&mut self, val: u8) -> Result<()> {
        self.write(val)
    }

    fn write_u16(&mut self, val: u16) -> Result<()> {
        self.write((val >> 8) as u8)?;
        self.write((val & 0xFF) as u8)?;
        Ok(())
    }

    /// Write a domain name as a sequence of length-prefixed labels followed
    /// by the zero terminator.
    fn write_qname(&mut self, qname: &str) -> Result<()> {
        for label in qname.split('.') {
            let len = label.len();
            if len > 0x3F {
                return Err(BufferError::LabelTooLong);
            }

            self.write_u8(len as u8)?;
            for b in label.as_bytes() {
                self.write_u8(*b)?;
            }
        }

        self.write_u8(0)?;
        Ok(())
    }
}

/// A growable buffer backed by a `Vec`, used for outgoing queries and for
/// re-reading raw response bytes.
#[derive(Default)]
pub struct VectorPacketBuffer {
    pub buffer: Vec<u8>,
    pub pos: usize,
}

impl VectorPacketBuffer {
    pub fn new() -> VectorPacketBuffer {
        VectorPacketBuffer {
            buffer: Vec::new(),
            pos: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> VectorPacketBuffer {
        VectorPacketBuffer {
            buffer: bytes.to_vec(),
            pos: 0,
        }
    }
}

impl PacketBuffer for VectorPacketBuffer {
    fn read(&mut self) -> Result<u8> {
        if self.pos >= self.buffer.len() {
            return Err(BufferError::EndOfBuffer);
        }

        let res = self.buffer[self.pos];
        self.pos += 1;
        Ok(res)
    }

    fn write(&mut self, val: u8) -> Result<()> {
        self.buffer.push(val);
        self.pos += 1;
        Ok(())
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        self.pos = pos;
        Ok(())
    }
}
