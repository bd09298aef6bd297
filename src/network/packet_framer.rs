use crate::constants::{MAX_PACKET_LENGTH, PACKET_HEADER_SIZE};

/// One logical packet. Payloads split over several max-length wire packets
/// are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub sequence_id: u8,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    Header,
    Body { length: usize, sequence_id: u8 },
}

/// Reassembles packets from arbitrarily split transport reads.
#[derive(Debug)]
pub struct PacketFramer {
    buffer: Vec<u8>,
    state: FramerState,
    continued: Option<Vec<u8>>,
}

impl PacketFramer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: FramerState::Header,
            continued: None,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Whether bytes of an incomplete packet are buffered.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
            || self.continued.is_some()
            || self.state != FramerState::Header
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn next_packet(&mut self) -> Option<Packet> {
        loop {
            match self.state {
                FramerState::Header => {
                    if self.buffer.len() < PACKET_HEADER_SIZE {
                        return None;
                    }
                    let length = self.buffer[0] as usize
                        | (self.buffer[1] as usize) << 8
                        | (self.buffer[2] as usize) << 16;
                    let sequence_id = self.buffer[3];
                    self.buffer.drain(..PACKET_HEADER_SIZE);
                    self.state = FramerState::Body {
                        length,
                        sequence_id,
                    };
                }

                FramerState::Body {
                    length,
                    sequence_id,
                } => {
                    if self.buffer.len() < length {
                        return None;
                    }
                    let payload: Vec<u8> = self.buffer.drain(..length).collect();
                    self.state = FramerState::Header;

                    if length == MAX_PACKET_LENGTH {
                        self.continued
                            .get_or_insert_with(Vec::new)
                            .extend_from_slice(&payload);
                        continue;
                    }

                    let payload = match self.continued.take() {
                        Some(mut head) => {
                            head.extend_from_slice(&payload);
                            head
                        }
                        None => payload,
                    };
                    return Some(Packet {
                        sequence_id,
                        payload,
                    });
                }
            }
        }
    }
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixes `payload` with the 4-byte packet header.
pub fn encode_packet(payload: &[u8], sequence_id: u8) -> Vec<u8> {
    let len = payload.len();
    let mut packet = Vec::with_capacity(PACKET_HEADER_SIZE + len);
    packet.push((len & 0xFF) as u8);
    packet.push(((len >> 8) & 0xFF) as u8);
    packet.push(((len >> 16) & 0xFF) as u8);
    packet.push(sequence_id);
    packet.extend_from_slice(payload);
    packet
}
