//! Byte-exact wire encoding, shared by every on-heap struct in this
//! crate. Grounded on the teacher's `fs_format::ByteEncoded` trait.

use crate::error::{HeapError, HeapResult};

pub trait ByteEncoded
where
    Self: Sized,
{
    fn encode(&self) -> Vec<u8>;

    fn decode(bytes: &[u8]) -> HeapResult<Self> {
        let mut reader = std::io::Cursor::new(bytes);
        Self::decode_from_reader(&mut reader)
    }

    fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()>;

    fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self>;

    fn byte_size() -> u16 {
        0
    }
}

pub trait GetByteSliceExt {
    fn get_byte_slice(&self, start: usize, end: usize) -> HeapResult<&[u8]>;
    fn get_byte_slice_mut(&mut self, start: usize, end: usize) -> HeapResult<&mut [u8]>;
}

impl GetByteSliceExt for [u8] {
    fn get_byte_slice(&self, start: usize, end: usize) -> HeapResult<&[u8]> {
        self.get(start..end).ok_or(HeapError::NotEnoughBytes {
            expected: end,
            actual: self.len(),
        })
    }

    fn get_byte_slice_mut(&mut self, start: usize, end: usize) -> HeapResult<&mut [u8]> {
        let len = self.len();
        self.get_mut(start..end)
            .ok_or(HeapError::NotEnoughBytes { expected: end, actual: len })
    }
}

macro_rules! impl_byte_encoded_int {
    ($ty:ty, $size:expr) => {
        impl ByteEncoded for $ty {
            fn encode(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn decode(bytes: &[u8]) -> HeapResult<Self> {
                let mut buf = [0u8; $size];
                buf.copy_from_slice(bytes.get_byte_slice(0, $size)?);
                Ok(<$ty>::from_le_bytes(buf))
            }

            fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()> {
                Ok(writer.write_all(&self.to_le_bytes())?)
            }

            fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self> {
                let mut buf = [0u8; $size];
                reader.read_exact(&mut buf)?;
                Ok(<$ty>::from_le_bytes(buf))
            }

            fn byte_size() -> u16 {
                $size
            }
        }
    };
}

impl_byte_encoded_int!(u8, 1);
impl_byte_encoded_int!(u16, 2);
impl_byte_encoded_int!(u32, 4);
impl_byte_encoded_int!(u64, 8);
impl_byte_encoded_int!(i16, 2);
impl_byte_encoded_int!(i32, 4);
impl_byte_encoded_int!(i64, 8);

impl<T> ByteEncoded for Vec<T>
where
    T: ByteEncoded,
{
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for item in self {
            buf.extend(item.encode());
        }
        buf
    }

    fn decode(bytes: &[u8]) -> HeapResult<Self> {
        if T::byte_size() == 0 {
            return Self::decode_from_reader(&mut std::io::Cursor::new(bytes));
        }
        if bytes.len() % T::byte_size() as usize != 0 {
            return Err(HeapError::InvalidSize {
                expected: T::byte_size() as usize,
                actual: bytes.len(),
            });
        }
        bytes
            .chunks(T::byte_size() as usize)
            .map(T::decode)
            .collect()
    }

    fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()> {
        for item in self {
            item.encode_into_writer(writer)?;
        }
        Ok(())
    }

    fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let mut cursor = std::io::Cursor::new(buf);
        let mut items = Vec::new();
        while cursor.position() < cursor.get_ref().len() as u64 {
            items.push(T::decode_from_reader(&mut cursor)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_round_trips() {
        let encoded = 0xDEADBEEFu32.encode();
        assert_eq!(u32::decode(&encoded).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn vec_of_u16_round_trips() {
        let v: Vec<u16> = vec![1, 2, 3];
        let encoded = v.encode();
        assert_eq!(Vec::<u16>::decode(&encoded).unwrap(), v);
    }
}
