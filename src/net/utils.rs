use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

/// Hard cap on a single framed message. Nothing the engine sends comes
/// anywhere near this; a larger prefix means a corrupt or hostile peer.
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

/// Writes one length-prefixed bincode frame: a little-endian u32 byte
/// count followed by the payload.
pub fn write_prefixed<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    let bytes =
        bincode::serialize(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = u32::try_from(bytes.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "frame too large"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()
}

/// Reads one length-prefixed bincode frame written by [`write_prefixed`].
pub fn read_prefixed<R: Read, T: DeserializeOwned>(reader: &mut R) -> io::Result<T> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_le_bytes(prefix);
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame exceeds size limit",
        ));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    bincode::deserialize(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::events::WireEvent;
    use std::io::Cursor;

    #[test]
    fn frames_round_trip() {
        let events = [
            WireEvent::Join {
                ip: "192.168.1.20".to_string(),
                port: 40312,
            },
            WireEvent::Peer { seat: 2 },
            WireEvent::Play {
                suit: "HEARTS".to_string(),
                rank: "QUEEN".to_string(),
            },
            WireEvent::Ready { player_index: 1 },
        ];
        let mut wire = Vec::new();
        for event in &events {
            write_prefixed(&mut wire, event).unwrap();
        }
        let mut reader = Cursor::new(wire);
        for event in &events {
            let decoded: WireEvent = read_prefixed(&mut reader).unwrap();
            assert_eq!(&decoded, event);
        }
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let mut wire = Vec::new();
        write_prefixed(&mut wire, &WireEvent::Ready { player_index: 0 }).unwrap();
        wire.truncate(wire.len() - 1);
        let mut reader = Cursor::new(wire);
        assert!(read_prefixed::<_, WireEvent>(&mut reader).is_err());
    }

    #[test]
    fn oversized_prefix_is_rejected_before_allocation() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&(MAX_FRAME_SIZE + 1).to_le_bytes());
        let mut reader = Cursor::new(wire);
        let err = read_prefixed::<_, WireEvent>(&mut reader).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
