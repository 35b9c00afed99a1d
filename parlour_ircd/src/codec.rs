//! Line framing for the client protocol.
//!
//! Incoming bytes are split on CR, LF or CRLF; each non-empty line is parsed
//! into a [`ClientMessage`]. Outgoing lines are terminated with CRLF.

use crate::client_message::ClientMessage;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum line length, including the terminator
pub const MAX_LINE_LENGTH: usize = 512;

#[derive(Debug, Error)]
pub enum CodecError
{
    /// A line exceeded [`MAX_LINE_LENGTH`]. The offending bytes have been
    /// discarded and decoding may continue.
    #[error("Input line was too long")]
    LineTooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Splits a byte stream into [`ClientMessage`]s
#[derive(Debug, Default)]
pub struct LineCodec
{
    /// Discarding the tail of an over-long line until its terminator arrives
    skipping: bool,
}

impl LineCodec
{
    pub fn new() -> Self
    {
        Self::default()
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize>
{
    buf.iter().position(|b| *b == b'\r' || *b == b'\n')
}

/// Decode a line as UTF-8, reading it as Latin-1 if that fails
fn decode_text(line: &[u8]) -> String
{
    match std::str::from_utf8(line) {
        Ok(s) => s.to_string(),
        Err(_) => line.iter().map(|b| *b as char).collect(),
    }
}

impl Decoder for LineCodec
{
    type Item = ClientMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error>
    {
        loop {
            let Some(pos) = find_terminator(src) else {
                if src.len() >= MAX_LINE_LENGTH
                {
                    tracing::debug!(bytes = src.len(), "Discarding over-long partial line");
                    src.clear();
                    if !self.skipping
                    {
                        self.skipping = true;
                        return Err(CodecError::LineTooLong);
                    }
                }
                return Ok(None);
            };

            let line = src.split_to(pos);
            // A lone CR is a complete terminator; an LF straight after it
            // is consumed with it when already present, and otherwise shows
            // up later as an empty line.
            let mut terminator = 1;
            if src[0] == b'\r' && src.len() > 1 && src[1] == b'\n'
            {
                terminator = 2;
            }
            src.advance(terminator);

            if self.skipping
            {
                self.skipping = false;
                continue;
            }

            if line.len() + 2 > MAX_LINE_LENGTH
            {
                return Err(CodecError::LineTooLong);
            }

            if let Some(message) = ClientMessage::parse(&decode_text(&line))
            {
                return Ok(Some(message));
            }
        }
    }
}

impl Encoder<&str> for LineCodec
{
    type Error = CodecError;

    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error>
    {
        dst.reserve(item.len() + 2);
        dst.put_slice(item.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<&ClientMessage> for LineCodec
{
    type Error = CodecError;

    fn encode(&mut self, item: &ClientMessage, dst: &mut BytesMut) -> Result<(), Self::Error>
    {
        let line = item.serialize();
        <Self as Encoder<&str>>::encode(self, line.as_str(), dst)
    }
}

/// Terminate a single outbound line, ready to hand to a connection
pub fn encode_line(line: &str) -> Bytes
{
    let mut buf = BytesMut::with_capacity(line.len() + 2);
    buf.put_slice(line.as_bytes());
    buf.put_slice(b"\r\n");
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Some(msg) = codec.decode(buf).unwrap() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn all_terminators() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK a\r\nUSER a 0 * :A\nPING x\rPONG y\r\n");
        let msgs = decode_all(&mut codec, &mut buf);

        let commands: Vec<_> = msgs.iter().map(|m| m.command.as_str()).collect();
        assert_eq!(commands, ["NICK", "USER", "PING", "PONG"]);
        assert_eq!(msgs[1].args, ["a", "0", "*", "A"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_lines_wait() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK wi");
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"NICK wi");

        buf.extend_from_slice(b"ngs\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.args, ["wings"]);
    }

    #[test]
    fn byte_at_a_time_matches_bulk() {
        let input = b":pre PRIVMSG #a :hello world\r\n\r\nJOIN #b\nQUIT :bye\r\n";

        let mut bulk_codec = LineCodec::new();
        let mut bulk = BytesMut::from(&input[..]);
        let expected = decode_all(&mut bulk_codec, &mut bulk);
        assert_eq!(expected.len(), 3);

        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let mut got = Vec::new();
        for byte in input.iter() {
            buf.put_u8(*byte);
            got.extend(decode_all(&mut codec, &mut buf));
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn empty_lines_skipped() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("\r\n\n   \r\nPING x\r\n");
        let msgs = decode_all(&mut codec, &mut buf);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].command, "PING");
    }

    #[test]
    fn latin1_fallback() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :caf\xe9\r\n"[..]);
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.args[1], "caf\u{e9}");
    }

    #[test]
    fn long_line_rejected_then_recovers() {
        let mut codec = LineCodec::new();
        let long = format!("PRIVMSG #a :{}\r\nPING ok\r\n", "x".repeat(600));
        let mut buf = BytesMut::from(long.as_str());

        assert!(matches!(codec.decode(&mut buf), Err(CodecError::LineTooLong)));
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn long_partial_line_skipped_until_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("x".repeat(600).as_str());

        assert!(matches!(codec.decode(&mut buf), Err(CodecError::LineTooLong)));
        assert!(buf.is_empty());

        buf.extend_from_slice(b"more tail\r\nPING ok\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn encode_round_trip() {
        let mut codec = LineCodec::new();
        let msg = ClientMessage::parse(":srv NOTICE * :two words here").unwrap();

        let mut buf = BytesMut::new();
        codec.encode(&msg, &mut buf).unwrap();
        assert!(buf.ends_with(b"\r\n"));

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(&encode_line("PING :x")[..], b"PING :x\r\n");
    }
}
