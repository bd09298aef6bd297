use std::{
    net::Shutdown,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_std::{
    io::{ReadExt, WriteExt},
    net::TcpStream,
};
use tracing::{debug, trace};

use crate::{
    binlog_error::BinlogError,
    constants::{ERROR_PACKET_STATUS, MAX_PACKET_LENGTH},
    event::error_event::ErrorEvent,
};

use super::packet_framer::{encode_packet, Packet, PacketFramer};

const READ_BUFFER_SIZE: usize = 64 * 1024;

pub struct PacketChannel {
    stream: TcpStream,
    framer: PacketFramer,
    read_buf: Vec<u8>,
    sequence_id: u8,
    closed: Arc<AtomicBool>,
}

impl PacketChannel {
    pub async fn connect(
        host: &str,
        port: u16,
        timeout_secs: u64,
    ) -> Result<Self, BinlogError> {
        let addr = format!("{}:{}", host, port);
        debug!("connecting to {}", addr);
        let connect = TcpStream::connect(addr.clone());
        let res = if timeout_secs > 0 {
            async_std::future::timeout(Duration::from_secs(timeout_secs), connect)
                .await
                .map_err(|_| BinlogError::Timeout(format!("connecting to {}", addr)))?
        } else {
            connect.await
        };
        let stream = res.map_err(|e| BinlogError::ConnectError(format!("{}: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            framer: PacketFramer::new(),
            read_buf: vec![0; READ_BUFFER_SIZE],
            sequence_id: 0,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reads the next packet, or `Ok(None)` once the connection is closed.
    pub async fn read_packet(&mut self) -> Result<Option<Packet>, BinlogError> {
        loop {
            if let Some(packet) = self.framer.next_packet() {
                self.sequence_id = packet.sequence_id.wrapping_add(1);
                trace!("read packet seq {} len {}", packet.sequence_id, packet.payload.len());
                return Ok(Some(packet));
            }

            let n = match self.stream.read(&mut self.read_buf).await {
                Ok(n) => n,
                Err(_) if self.is_closed() => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                if self.framer.has_partial() && !self.is_closed() {
                    return Err(BinlogError::UnexpectedEof {
                        needed: 1,
                        remaining: self.framer.buffered_len(),
                    });
                }
                return Ok(None);
            }
            self.framer.push(&self.read_buf[..n]);
        }
    }

    /// Reads a packet that must exist, turning server error packets into
    /// [`BinlogError::ServerError`].
    pub async fn read_response(&mut self) -> Result<Vec<u8>, BinlogError> {
        let packet = self.read_packet().await?.ok_or_else(|| {
            BinlogError::ConnectError("connection closed by server".into())
        })?;
        if packet.payload.first() == Some(&ERROR_PACKET_STATUS) {
            let mut cursor = std::io::Cursor::new(&packet.payload[1..]);
            return Err(ErrorEvent::parse(&mut cursor)?.into_error());
        }
        Ok(packet.payload)
    }

    /// Writes `payload`, splitting it into max-length packets when needed.
    pub async fn write_packet(&mut self, payload: &[u8]) -> Result<(), BinlogError> {
        let mut offset = 0;
        loop {
            let end = (offset + MAX_PACKET_LENGTH).min(payload.len());
            let chunk = &payload[offset..end];
            self.stream
                .write_all(&encode_packet(chunk, self.sequence_id))
                .await?;
            self.sequence_id = self.sequence_id.wrapping_add(1);
            offset = end;
            // a max-length packet is always followed by another, possibly empty
            if chunk.len() < MAX_PACKET_LENGTH {
                break;
            }
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Starts a new command exchange.
    pub fn reset_sequence(&mut self) {
        self.sequence_id = 0;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_handle(&self) -> ChannelCloser {
        ChannelCloser {
            stream: self.stream.clone(),
            closed: self.closed.clone(),
        }
    }
}

/// Shuts the socket down from another task; a pending read then ends.
#[derive(Clone)]
pub struct ChannelCloser {
    stream: TcpStream,
    closed: Arc<AtomicBool>,
}

impl ChannelCloser {
    pub fn close(&self) -> Result<(), BinlogError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("closing binlog connection");
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
