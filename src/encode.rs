//! Serialize data into the bytecode protocol.
//!
//! Every wire value implements [`ToByte`] and writes itself at the write
//! cursor of a [`ByteBuffer`]. A value is either written whole or not at
//! all: room is validated before the first byte goes in.
use std::mem::size_of;

use bytes::BufMut;

use crate::{
    buffer::ByteBuffer,
    error::{Error, Result},
};

// Helper macro to safely convert an usize expression into a signed
// integer.  If the conversion is not possible the macro issues a
// `MalformedField`, otherwise returns the expression
// in the requested target type.
macro_rules! try_usize_to_int {
    ($value:expr, $ttype:ident) => {{
        let maxv = $ttype::MAX;
        let x: usize = $value;
        if (x as u64) <= (maxv as u64) {
            x as $ttype
        } else {
            return Err(Error::MalformedField(format!(
                "length {} does not fit in {}",
                x,
                stringify!($ttype)
            )));
        }
    }};
}

// Fixed width integers go through `BufMut` on the unwritten slice, which
// always lays them out big endian.
macro_rules! fixed_width {
    ($ttype:ty, $put:ident) => {
        impl ToByte for $ttype {
            fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
                buffer.validate_write(size_of::<$ttype>())?;
                let mut dst = buffer.unfilled_mut();
                dst.$put(*self);
                buffer.append_write(size_of::<$ttype>());
                Ok(())
            }
        }
    };
}

pub trait ToByte {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()>;
}

impl<'a, T: ToByte + 'a + ?Sized> ToByte for &'a T {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        (*self).encode(buffer)
    }
}

fixed_width!(i8, put_i8);
fixed_width!(i16, put_i16);
fixed_width!(i32, put_i32);
fixed_width!(i64, put_i64);

impl ToByte for bool {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        (*self as i8).encode(buffer)
    }
}

/// Strings that are missing, empty or only whitespace all go out as the
/// null sentinel: a `-1` length and no payload.
impl<'a> ToByte for Option<&'a str> {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        match self {
            Some(s) if !s.trim().is_empty() => {
                let l = try_usize_to_int!(s.len(), i16);
                buffer.validate_write(size_of::<i16>() + s.len())?;
                l.encode(buffer)?;
                buffer.put_slice(s.as_bytes())
            }
            _ => (-1i16).encode(buffer),
        }
    }
}

impl ToByte for Option<String> {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.as_deref().encode(buffer)
    }
}

impl ToByte for str {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        Some(self).encode(buffer)
    }
}

impl ToByte for String {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.as_str().encode(buffer)
    }
}

impl<V: ToByte> ToByte for [V] {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        encode_as_array(buffer, self, |buffer, x| x.encode(buffer))
    }
}

impl<V: ToByte> ToByte for Vec<V> {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        self.as_slice().encode(buffer)
    }
}

// ~ this allows to render a slice of various types (typically &str
// and String) as strings
pub struct AsStrings<'a, T>(pub &'a [T]);

impl<'a, T: AsRef<str> + 'a> ToByte for AsStrings<'a, T> {
    fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        encode_as_array(buffer, self.0, |buffer, x| x.as_ref().encode(buffer))
    }
}

/// ~ Renders the length of `xs` to `buffer` as the start of a
/// protocol array and then for each element of `xs` invokes `f`
/// assuming that function will render the element to the buffer.
pub fn encode_as_array<T, F>(buffer: &mut ByteBuffer, xs: &[T], mut f: F) -> Result<()>
where
    F: FnMut(&mut ByteBuffer, &T) -> Result<()>,
{
    let l = try_usize_to_int!(xs.len(), i32);
    l.encode(buffer)?;
    for x in xs {
        f(buffer, x)?;
    }
    Ok(())
}

/// Copy `count` bytes of `data`, starting at `offset`, in at the write cursor.
pub fn write_bytes(buffer: &mut ByteBuffer, data: &[u8], offset: usize, count: usize) -> Result<()> {
    let src = data
        .get(offset..offset + count)
        .ok_or(Error::BufferUnderrun {
            requested: offset + count,
            available: data.len(),
        })?;
    buffer.put_slice(src)
}
