//! implements the DNS message codec in a transport agnostic fashion
//!
//! Only the header and the question section are modelled: an existence
//! probe needs nothing from the answer records themselves, just the header
//! flags, the response code and the answer count.

use std::fmt;

use derive_more::{Display, Error, From};

use crate::dns::buffer::{PacketBuffer, VectorPacketBuffer};

#[derive(Debug, Display, From, Error)]
pub enum ProtocolError {
    Buffer(crate::dns::buffer::BufferError),
}

type Result<T> = std::result::Result<T, ProtocolError>;

/// `QueryType` represents the requested Record Type of a query
///
/// An integer can be converted to a querytype using the `from_num` function,
/// and back to an integer using the `to_num` method.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy)]
pub enum QueryType {
    Unknown(u16),
    A,     // 1
    Ns,    // 2
    Cname, // 5
    Soa,   // 6
    Mb,    // 7
    Mg,    // 8
    Mr,    // 9
    Null,  // 10
    Wks,   // 11
    Ptr,   // 12
    Hinfo, // 13
    Minfo, // 14
    Mx,    // 15
    Txt,   // 16
    Axfr,  // 252
    Mailb, // 253
    All,   // 255
}

impl QueryType {
    pub fn to_num(&self) -> u16 {
        match *self {
            QueryType::Unknown(x) => x,
            QueryType::A => 1,
            QueryType::Ns => 2,
            QueryType::Cname => 5,
            QueryType::Soa => 6,
            QueryType::Mb => 7,
            QueryType::Mg => 8,
            QueryType::Mr => 9,
            QueryType::Null => 10,
            QueryType::Wks => 11,
            QueryType::Ptr => 12,
            QueryType::Hinfo => 13,
            QueryType::Minfo => 14,
            QueryType::Mx => 15,
            QueryType::Txt => 16,
            QueryType::Axfr => 252,
            QueryType::Mailb => 253,
            QueryType::All => 255,
        }
    }

    pub fn from_num(num: u16) -> QueryType {
        match num {
            1 => QueryType::A,
            2 => QueryType::Ns,
            5 => QueryType::Cname,
            6 => QueryType::Soa,
            7 => QueryType::Mb,
            8 => QueryType::Mg,
            9 => QueryType::Mr,
            10 => QueryType::Null,
            11 => QueryType::Wks,
            12 => QueryType::Ptr,
            13 => QueryType::Hinfo,
            14 => QueryType::Minfo,
            15 => QueryType::Mx,
            16 => QueryType::Txt,
            252 => QueryType::Axfr,
            253 => QueryType::Mailb,
            255 => QueryType::All,
            _ => QueryType::Unknown(num),
        }
    }
}

impl Default for QueryType {
    fn default() -> QueryType {
        QueryType::Soa
    }
}

/// The result code for a DNS query, as described in RFC 1035
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultCode {
    NOERROR = 0,
    FORMERR = 1,
    SERVFAIL = 2,
    NXDOMAIN = 3,
    NOTIMP = 4,
    REFUSED = 5,
}

impl Default for ResultCode {
    fn default() -> ResultCode {
        ResultCode::NOERROR
    }
}

impl ResultCode {
    pub fn from_num(num: u8) -> ResultCode {
        match num {
            1 => ResultCode::FORMERR,
            2 => ResultCode::SERVFAIL,
            3 => ResultCode::NXDOMAIN,
            4 => ResultCode::NOTIMP,
            5 => ResultCode::REFUSED,
            _ => ResultCode::NOERROR,
        }
    }
}

/// Transport selection for a query, which also determines the framing
/// offset: TCP messages carry a two byte big-endian length prefix, UDP
/// messages do not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Proto {
    Udp,
    Tcp,
}

impl Proto {
    /// Number of framing bytes preceding the header for this transport.
    pub fn prefix_len(&self) -> usize {
        match *self {
            Proto::Udp => 0,
            Proto::Tcp => 2,
        }
    }
}

/// Representation of a DNS header
#[derive(Clone, Debug, Default)]
pub struct DnsHeader {
    pub id: u16, // 16 bits

    pub recursion_desired: bool,    // 1 bit
    pub truncated_message: bool,    // 1 bit
    pub authoritative_answer: bool, // 1 bit
    pub opcode: u8,                 // 4 bits
    pub response: bool,             // 1 bit

    pub rescode: ResultCode,       // 4 bits
    pub z: u8,                     // 3 bits
    pub recursion_available: bool, // 1 bit

    pub questions: u16,             // 16 bits
    pub answers: u16,               // 16 bits
    pub authoritative_entries: u16, // 16 bits
    pub resource_entries: u16,      // 16 bits
}

impl DnsHeader {
    pub fn new() -> DnsHeader {
        DnsHeader::default()
    }

    pub fn binary_len(&self) -> usize {
        12
    }

    pub fn write<T: PacketBuffer>(&self, buffer: &mut T) -> Result<()> {
        buffer.write_u16(self.id)?;

        buffer.write_u8(
            (self.recursion_desired as u8)
                | ((self.truncated_message as u8) << 1)
                | ((self.authoritative_answer as u8) << 2)
                | (self.opcode << 3)
                | ((self.response as u8) << 7),
        )?;

        buffer.write_u8(
            (self.rescode as u8) | (self.z << 4) | ((self.recursion_available as u8) << 7),
        )?;

        buffer.write_u16(self.questions)?;
        buffer.write_u16(self.answers)?;
        buffer.write_u16(self.authoritative_entries)?;
        buffer.write_u16(self.resource_entries)?;

        Ok(())
    }

    pub fn read<T: PacketBuffer>(&mut self, buffer: &mut T) -> Result<()> {
        self.id = buffer.read_u16()?;

        let flags = buffer.read_u16()?;
        let a = (flags >> 8) as u8;
        let b = (flags & 0xFF) as u8;
        self.recursion_desired = (a & (1 << 0)) > 0;
        self.truncated_message = (a & (1 << 1)) > 0;
        self.authoritative_answer = (a & (1 << 2)) > 0;
        self.opcode = (a >> 3) & 0x0F;
        self.response = (a & (1 << 7)) > 0;

        self.rescode = ResultCode::from_num(b & 0x0F);
        self.z = (b >> 4) & 0x07;
        self.recursion_available = (b & (1 << 7)) > 0;

        self.questions = buffer.read_u16()?;
        self.answers = buffer.read_u16()?;
        self.authoritative_entries = buffer.read_u16()?;
        self.resource_entries = buffer.read_u16()?;

        Ok(())
    }
}

impl fmt::Display for DnsHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DnsHeader:")?;
        writeln!(f, "\tid: {0}", self.id)?;
        writeln!(f, "\tresponse: {0}", self.response)?;
        writeln!(f, "\trescode: {:?}", self.rescode)?;
        writeln!(f, "\tquestions: {0}", self.questions)?;
        writeln!(f, "\tanswers: {0}", self.answers)?;

        Ok(())
    }
}

/// Representation of a DNS question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: QueryType,
}

impl DnsQuestion {
    pub fn new(name: String, qtype: QueryType) -> DnsQuestion {
        DnsQuestion { name, qtype }
    }

    pub fn binary_len(&self) -> usize {
        self.name
            .split('.')
            .map(|x| x.len() + 1)
            .fold(5, |x, y| x + y)
    }

    pub fn write<T: PacketBuffer>(&self, buffer: &mut T) -> Result<()> {
        buffer.write_qname(&self.name)?;

        buffer.write_u16(self.qtype.to_num())?;
        buffer.write_u16(1)?; // class IN

        Ok(())
    }
}

/// Summary of a raw response, read from the header at the transport offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseSummary {
    pub response: bool,
    pub authoritative: bool,
    pub truncated: bool,
    pub rescode: ResultCode,
    pub answers: u16,
}

/// Build the complete wire form of a single-question query.
///
/// The header is fixed: transaction id 0, recursion desired, exactly one
/// question and no records. Labels are sent uppercased, matching the root
/// zone registry convention; name servers compare case-insensitively
/// anyway. Identical inputs always yield identical bytes.
pub fn encode_query(name: &str, qtype: QueryType, proto: Proto) -> Result<Vec<u8>> {
    let mut header = DnsHeader::new();
    header.id = 0;
    header.recursion_desired = true;
    header.questions = 1;

    let question = DnsQuestion::new(name.to_ascii_uppercase(), qtype);

    let mut buffer = VectorPacketBuffer::new();
    header.write(&mut buffer)?;
    question.write(&mut buffer)?;

    match proto {
        Proto::Udp => Ok(buffer.buffer),
        Proto::Tcp => {
            let body_len = header.binary_len() + question.binary_len();
            let mut framed = Vec::with_capacity(body_len + 2);
            framed.push((body_len >> 8) as u8);
            framed.push((body_len & 0xFF) as u8);
            framed.extend_from_slice(&buffer.buffer);
            Ok(framed)
        }
    }
}

/// Read the header fields of a raw response at the transport-adjusted
/// offset. Fails if the buffer is too short to hold a full header there.
pub fn decode_response(bytes: &[u8], proto: Proto) -> Result<ResponseSummary> {
    let mut buffer = VectorPacketBuffer::from_bytes(bytes);
    buffer.seek(proto.prefix_len())?;

    let mut header = DnsHeader::new();
    header.read(&mut buffer)?;

    Ok(ResponseSummary {
        response: header.response,
        authoritative: header.authoritative_answer,
        truncated: header.truncated_message,
        rescode: header.rescode,
        answers: header.answers,
    })
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_encode_udp_query() {
        let bytes = encode_query("aero", QueryType::Soa, Proto::Udp).unwrap();

        // 12 byte header: id 0, RD set, QDCOUNT 1, everything else 0
        assert_eq!(
            &bytes[0..12],
            &[0x00, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );

        // question: label, terminator, type SOA, class IN
        assert_eq!(
            &bytes[12..],
            &[0x04, b'A', b'E', b'R', b'O', 0x00, 0x00, 0x06, 0x00, 0x01]
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode_query("icann.org", QueryType::Soa, Proto::Udp).unwrap();
        let second = encode_query("icann.org", QueryType::Soa, Proto::Udp).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_binary_len_matches_encoding() {
        let header = DnsHeader::new();
        let question = DnsQuestion::new("icann.org".to_string(), QueryType::Soa);
        let bytes = encode_query("icann.org", QueryType::Soa, Proto::Udp).unwrap();

        assert_eq!(bytes.len(), header.binary_len() + question.binary_len());
    }

    #[test]
    fn test_encode_tcp_prefix() {
        let udp = encode_query("aero", QueryType::Soa, Proto::Udp).unwrap();
        let tcp = encode_query("aero", QueryType::Soa, Proto::Tcp).unwrap();

        assert_eq!(tcp.len(), udp.len() + 2);
        let prefix = ((tcp[0] as usize) << 8) | (tcp[1] as usize);
        assert_eq!(prefix, udp.len());
        assert_eq!(&tcp[2..], &udp[..]);
    }

    #[test]
    fn test_decode_response_flags() {
        let mut bytes = encode_query("aero", QueryType::Soa, Proto::Udp).unwrap();
        bytes[2] |= 0x80; // QR
        bytes[7] = 1; // one answer

        let summary = decode_response(&bytes, Proto::Udp).unwrap();
        assert!(summary.response);
        assert_eq!(summary.rescode, ResultCode::NOERROR);
        assert_eq!(summary.answers, 1);
    }

    #[test]
    fn test_decode_tcp_offset() {
        let mut bytes = encode_query("aero", QueryType::Soa, Proto::Tcp).unwrap();
        bytes[4] |= 0x80; // QR, two bytes past the length prefix
        bytes[5] = 0x03; // NXDOMAIN

        let summary = decode_response(&bytes, Proto::Tcp).unwrap();
        assert!(summary.response);
        assert_eq!(summary.rescode, ResultCode::NXDOMAIN);
        assert_eq!(summary.answers, 0);
    }

    #[test]
    fn test_decode_short_buffer() {
        assert!(decode_response(&[0x00; 8], Proto::Udp).is_err());
        assert!(decode_response(&[0x00; 12], Proto::Tcp).is_err());
    }

    #[test]
    fn test_header_roundtrip() {
        let mut header = DnsHeader::new();
        header.id = 1337;
        header.response = true;
        header.recursion_desired = true;
        header.rescode = ResultCode::REFUSED;
        header.questions = 1;
        header.answers = 3;

        let mut buffer = VectorPacketBuffer::new();
        header.write(&mut buffer).unwrap();
        buffer.seek(0).unwrap();

        let mut parsed = DnsHeader::new();
        parsed.read(&mut buffer).unwrap();

        assert_eq!(parsed.id, 1337);
        assert!(parsed.response);
        assert!(parsed.recursion_desired);
        assert_eq!(parsed.rescode, ResultCode::REFUSED);
        assert_eq!(parsed.questions, 1);
        assert_eq!(parsed.answers, 3);
    }

    #[test]
    fn test_query_type_num_roundtrip() {
        for qtype in &[QueryType::A, QueryType::Soa, QueryType::Mailb, QueryType::All] {
            assert_eq!(QueryType::from_num(qtype.to_num()), *qtype);
        }
        assert_eq!(QueryType::from_num(4711), QueryType::Unknown(4711));
    }
}
