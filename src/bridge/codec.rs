// src/bridge/codec.rs
//
// Frames are a little-endian u32 byte count followed by the UTF-8 JSON body.

use crate::constants::MAX_FRAME_SIZE;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

/// Read one frame body. `Ok(None)` means the peer closed the stream between
/// frames; a stream ending inside a header or body is an I/O error.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, AppError> {
    let mut len_bytes = [0u8; 4];
    let (first, rest) = len_bytes.split_at_mut(1);
    loop {
        match reader.read(first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    reader.read_exact(rest)?;

    let len = u32::from_le_bytes(len_bytes);
    let len = usize::try_from(len).map_err(|_| AppError::FrameTooLarge {
        len: usize::MAX,
        max: MAX_FRAME_SIZE,
    })?;
    if len > MAX_FRAME_SIZE {
        return Err(AppError::FrameTooLarge { len, max: MAX_FRAME_SIZE });
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(Some(buffer))
}

pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<(), AppError> {
    let too_large = || AppError::FrameTooLarge {
        len: body.len(),
        max: MAX_FRAME_SIZE,
    };
    if body.len() > MAX_FRAME_SIZE {
        return Err(too_large());
    }
    let len = u32::try_from(body.len()).map_err(|_| too_large())?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, AppError> {
    match read_frame(reader)? {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), AppError> {
    let json = serde_json::to_vec(message)?;
    write_frame(writer, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;

    #[test]
    fn test_frame_layout_is_little_endian_length_then_body() {
        let mut out = Vec::new();
        write_frame(&mut out, b"{}").unwrap();
        assert_eq!(out, vec![2, 0, 0, 0, b'{', b'}']);
    }

    #[test]
    fn test_reads_consecutive_messages_then_eof() {
        let mut out = Vec::new();
        write_message(&mut out, &json!({"n": 1})).unwrap();
        write_message(&mut out, &json!({"n": 2})).unwrap();

        let mut cursor = Cursor::new(out);
        let first: Value = read_message(&mut cursor).unwrap().unwrap();
        let second: Value = read_message(&mut cursor).unwrap().unwrap();
        let end: Option<Value> = read_message(&mut cursor).unwrap();

        assert_eq!(first["n"], 1);
        assert_eq!(second["n"], 2);
        assert!(end.is_none());
    }

    #[test]
    fn test_oversized_length_is_rejected_before_reading_body() {
        let len = u32::try_from(MAX_FRAME_SIZE + 1).unwrap();
        let mut cursor = Cursor::new(len.to_le_bytes().to_vec());
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, AppError::FrameTooLarge { .. }));
    }

    #[test]
    fn test_oversized_body_is_not_written() {
        let body = vec![b' '; MAX_FRAME_SIZE + 1];
        let mut out = Vec::new();
        assert!(matches!(
            write_frame(&mut out, &body),
            Err(AppError::FrameTooLarge { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(read_frame(&mut cursor), Err(AppError::Io(_))));
    }

    #[test]
    fn test_stream_ending_inside_header_is_an_error() {
        let mut cursor = Cursor::new(vec![5u8, 0]);
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, AppError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_header_after_complete_frame_is_still_checked() {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, b"{}").unwrap();
        bytes.push(7);
        let mut cursor = Cursor::new(bytes);

        assert_eq!(read_frame(&mut cursor).unwrap(), Some(b"{}".to_vec()));
        assert!(matches!(read_frame(&mut cursor), Err(AppError::Io(_))));
    }

    #[test]
    fn test_invalid_json_is_a_protocol_error() {
        let mut out = Vec::new();
        write_frame(&mut out, b"not json").unwrap();
        let mut cursor = Cursor::new(out);
        let result: Result<Option<Value>, _> = read_message(&mut cursor);
        assert!(matches!(result, Err(AppError::Protocol(_))));
    }
}
