//! The resumable HTTP/1.x request parser and the [`Request`] value type it
//! produces.
//!
//! [`RequestParser`] is a pull-free state machine: it owns no socket, just
//! the partial state of one in-flight message. Each call to
//! [`RequestParser::parse`] is handed a byte slice — as much or as little
//! as the caller happens to have buffered — and returns how many of those
//! bytes it consumed plus a [`ParseOutcome`]. A caller that gets
//! [`ParseOutcome::NeedMore`] shifts the unread suffix to the front of its
//! buffer, appends more bytes from the socket, and calls again; the parser
//! resumes exactly where it left off, even if the split fell inside a
//! method token, a header value, or a chunk-size hex digit.

use std::collections::HashMap;
use std::mem;

use bytes::{Bytes, BytesMut};

use super::cursor::Cursor;
use super::error::ParseError;
use super::headers::HeaderMap;
use super::limits::Limits;
use super::method::Method;
use super::scheme::Scheme;
use super::version::Version;

/// Coarse parser phase, used by the receive loop to classify which timeout
/// fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    NothingYet,
    StartLine,
    ExpectingNewline,
    HeaderName,
    HeaderValue,
    BodyFixed,
    BodyChunkedSize,
    BodyChunkedData,
    BodyChunkedTrailer,
    Completed,
}

/// What [`RequestParser::parse`] accomplished with the bytes it was given.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The buffer ran out mid-token. Append more bytes after the returned
    /// `consumed` count and call again.
    NeedMore,
    /// The message is complete.
    Complete(Box<Request>),
}

/// A fully parsed HTTP/1.x request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    version: Version,
    scheme: Scheme,
    host: Bytes,
    port: u16,
    path: Bytes,
    uri: Bytes,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: Bytes,
    content_length: usize,
}

impl Request {
    fn empty() -> Self {
        Self {
            method: Method::Get,
            version: Version::Unknown,
            scheme: Scheme::Unknown,
            host: Bytes::new(),
            port: 0,
            path: Bytes::new(),
            uri: Bytes::new(),
            headers: HeaderMap::new(),
            params: HashMap::new(),
            body: Bytes::new(),
            content_length: 0,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &[u8] {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The request path, including the leading `/`. Empty iff the
    /// request-target was `*`.
    pub fn path(&self) -> &[u8] {
        &self.path
    }

    /// The raw request-target exactly as received.
    pub fn uri(&self) -> &[u8] {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a query parameter by key (no percent-decoding is performed —
    /// keys and values are stored verbatim).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// `true` iff the connection should be kept open after this request,
    /// from the request side of the keep-alive rule; the session driver
    /// also folds in the response side and the reuse counter.
    pub fn wants_keep_alive(&self) -> bool {
        let close_requested = self
            .headers
            .get("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"));
        if close_requested {
            return false;
        }
        if self.version.at_least_1_1() {
            true
        } else {
            self.headers
                .get("connection")
                .is_some_and(|v| v.eq_ignore_ascii_case("keep-alive"))
        }
    }
}

/// Which body-framing mechanism a completed header block selected.
#[derive(Debug, Clone, Copy)]
enum Framing {
    /// No `Content-Length`, no chunked `Transfer-Encoding`: zero-length body.
    None,
    Fixed(usize),
    Chunked,
}

/// Accumulates raw bytes up to the next `CRLF`, byte by byte, across any
/// number of [`LineBuf::feed`] calls. This is the single mechanism the
/// parser uses to make every line-oriented piece of the grammar — the
/// request line, each header line, each chunk-size line, each trailer
/// line — resumable across an arbitrary split, including a split between
/// the `CR` and the `LF`.
#[derive(Debug, Default)]
struct LineBuf {
    data: Vec<u8>,
    saw_cr: bool,
}

impl LineBuf {
    fn feed(
        &mut self,
        cursor: &mut Cursor<'_>,
        max_len: usize,
        over_limit: ParseError,
    ) -> Result<Option<Vec<u8>>, ParseError> {
        while let Some(b) = cursor.next_byte() {
            if self.saw_cr {
                if b == b'\n' {
                    self.saw_cr = false;
                    return Ok(Some(mem::take(&mut self.data)));
                }
                return Err(ParseError::BadLineEnding);
            }
            if b == b'\r' {
                self.saw_cr = true;
            } else if b == b'\n' {
                return Err(ParseError::BadLineEnding);
            } else {
                self.data.push(b);
                if self.data.len() > max_len {
                    return Err(over_limit);
                }
            }
        }
        Ok(None)
    }

    /// `true` once a `CR` has been absorbed and we're waiting on its `LF` —
    /// used by the request line to report [`ParserState::ExpectingNewline`].
    fn awaiting_newline(&self) -> bool {
        self.saw_cr
    }
}

/// A resumable, explicit-state HTTP/1.x request parser.
///
/// See the module documentation for the resumability contract. One
/// `RequestParser` parses exactly one message; construct a new one (or call
/// [`RequestParser::reset`]) for the next request on a reused connection.
#[derive(Debug)]
pub struct RequestParser {
    limits: Limits,
    state: ParserState,
    stale: Option<ParseError>,
    last_consumed: usize,

    line: LineBuf,
    header_bytes_seen: usize,
    header_saw_colon: bool,
    trailer_count: usize,

    request: Request,
    framing: Option<Framing>,
    body: BytesMut,
    body_remaining: usize,
    chunk_remaining: usize,
    chunk_trailer_crlf: LineBuf,
}

impl RequestParser {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            state: ParserState::NothingYet,
            stale: None,
            last_consumed: 0,
            line: LineBuf::default(),
            header_bytes_seen: 0,
            header_saw_colon: false,
            trailer_count: 0,
            request: Request::empty(),
            framing: None,
            body: BytesMut::new(),
            body_remaining: 0,
            chunk_remaining: 0,
            chunk_trailer_crlf: LineBuf::default(),
        }
    }

    /// Resets all parsing state so this parser can be reused for the next
    /// request on a keep-alive connection, without reallocating its buffers.
    pub fn reset(&mut self) {
        self.state = ParserState::NothingYet;
        self.stale = None;
        self.last_consumed = 0;
        self.line = LineBuf::default();
        self.header_bytes_seen = 0;
        self.header_saw_colon = false;
        self.trailer_count = 0;
        self.request = Request::empty();
        self.framing = None;
        self.body.clear();
        self.body_remaining = 0;
        self.chunk_remaining = 0;
        self.chunk_trailer_crlf = LineBuf::default();
    }

    /// The parser's current coarse phase — used by the receive loop to pick
    /// which timeout error applies.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feeds `input` to the parser. Returns how many leading bytes of
    /// `input` were consumed and what happened.
    ///
    /// Once this returns `Err`, the parser is stale: every subsequent call
    /// returns `Err(ParseError::StaleParser)` without looking at `input`.
    pub fn parse(&mut self, input: &[u8]) -> Result<(usize, ParseOutcome), ParseError> {
        if let Some(err) = &self.stale {
            return Err(err.clone());
        }
        match self.parse_inner(input) {
            Ok(outcome) => Ok((self.last_consumed, outcome)),
            Err(err) => {
                self.stale = Some(ParseError::StaleParser);
                Err(err)
            }
        }
    }

    fn parse_inner(&mut self, input: &[u8]) -> Result<ParseOutcome, ParseError> {
        let mut cursor = Cursor::new(input);
        if self.state == ParserState::NothingYet && !input.is_empty() {
            self.state = ParserState::StartLine;
        }

        loop {
            match self.state {
                ParserState::NothingYet => {
                    self.last_consumed = cursor.pos();
                    return Ok(ParseOutcome::NeedMore);
                }
                ParserState::StartLine | ParserState::ExpectingNewline => {
                    match self.line.feed(
                        &mut cursor,
                        self.limits.request_line,
                        ParseError::BufferOverflow,
                    )? {
                        None => {
                            self.state = if self.line.awaiting_newline() {
                                ParserState::ExpectingNewline
                            } else {
                                ParserState::StartLine
                            };
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                        Some(line) => {
                            self.apply_request_line(&line)?;
                            self.state = ParserState::HeaderName;
                            self.header_saw_colon = false;
                        }
                    }
                }
                ParserState::HeaderName | ParserState::HeaderValue => {
                    let before = self.line.data.len();
                    match self.line.feed(
                        &mut cursor,
                        self.limits.header_line,
                        ParseError::HeaderLimit,
                    )? {
                        None => {
                            if !self.header_saw_colon {
                                let new_bytes = &self.line.data[before..];
                                if new_bytes.contains(&b':') {
                                    self.header_saw_colon = true;
                                }
                            }
                            self.state = if self.header_saw_colon {
                                ParserState::HeaderValue
                            } else {
                                ParserState::HeaderName
                            };
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                        Some(line) => {
                            self.header_saw_colon = false;
                            if line.is_empty() {
                                self.begin_body()?;
                            } else {
                                self.apply_header_line(&line)?;
                                self.state = ParserState::HeaderName;
                            }
                        }
                    }
                }
                ParserState::BodyFixed => {
                    let take = self.body_remaining.min(cursor.remaining_len());
                    if take > 0 {
                        let chunk = cursor.take(take).expect("bounded by remaining_len");
                        self.body.extend_from_slice(chunk);
                        self.body_remaining -= take;
                    }
                    if self.body_remaining == 0 {
                        self.finish();
                        self.last_consumed = cursor.pos();
                        return Ok(ParseOutcome::Complete(Box::new(self.take_request())));
                    }
                    self.last_consumed = cursor.pos();
                    return Ok(ParseOutcome::NeedMore);
                }
                ParserState::BodyChunkedSize => {
                    match self.line.feed(&mut cursor, 4096, ParseError::BadChunkExtension)? {
                        None => {
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                        Some(line) => {
                            let size = parse_chunk_size(&line)?;
                            if size == 0 {
                                self.state = ParserState::BodyChunkedTrailer;
                            } else {
                                let new_total = self
                                    .body
                                    .len()
                                    .checked_add(size)
                                    .ok_or(ParseError::BodyLimit)?;
                                if new_total > self.limits.body_bytes {
                                    return Err(ParseError::BodyLimit);
                                }
                                self.chunk_remaining = size;
                                self.state = ParserState::BodyChunkedData;
                            }
                        }
                    }
                }
                ParserState::BodyChunkedData => {
                    if self.chunk_remaining > 0 {
                        let take = self.chunk_remaining.min(cursor.remaining_len());
                        if take > 0 {
                            let chunk = cursor.take(take).expect("bounded by remaining_len");
                            self.body.extend_from_slice(chunk);
                            self.chunk_remaining -= take;
                        }
                        if self.chunk_remaining > 0 {
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                    }
                    match self
                        .chunk_trailer_crlf
                        .feed(&mut cursor, 2, ParseError::BadChunk)?
                    {
                        None => {
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                        Some(line) => {
                            if !line.is_empty() {
                                return Err(ParseError::BadChunk);
                            }
                            self.state = ParserState::BodyChunkedSize;
                        }
                    }
                }
                ParserState::BodyChunkedTrailer => {
                    match self.line.feed(
                        &mut cursor,
                        self.limits.header_line,
                        ParseError::HeaderLimit,
                    )? {
                        None => {
                            self.last_consumed = cursor.pos();
                            return Ok(ParseOutcome::NeedMore);
                        }
                        Some(line) => {
                            if line.is_empty() {
                                self.finish();
                                self.last_consumed = cursor.pos();
                                return Ok(ParseOutcome::Complete(Box::new(self.take_request())));
                            }
                            // Trailer headers are validated and counted like
                            // any other header line, then discarded.
                            if self.trailer_count >= self.limits.header_count {
                                return Err(ParseError::HeaderLimit);
                            }
                            self.trailer_count += 1;
                            self.header_bytes_seen += line.len();
                            if self.header_bytes_seen > self.limits.header_bytes {
                                return Err(ParseError::HeaderLimit);
                            }
                            validate_header_line(&line)?;
                        }
                    }
                }
                ParserState::Completed => {
                    self.last_consumed = cursor.pos();
                    return Ok(ParseOutcome::NeedMore);
                }
            }
        }
    }

    fn apply_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let parsed = RequestLine::parse(line)?;
        self.request.method = parsed.method;
        self.request.version = parsed.version;
        self.request.scheme = parsed.scheme;
        self.request.host = Bytes::from(parsed.host);
        self.request.port = parsed.port;
        self.request.path = Bytes::from(parsed.path);
        self.request.uri = Bytes::copy_from_slice(line_target(line));
        self.request.params = parsed.params;
        Ok(())
    }

    fn apply_header_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        if self.request.headers.len() >= self.limits.header_count {
            return Err(ParseError::HeaderLimit);
        }
        self.header_bytes_seen += line.len();
        if self.header_bytes_seen > self.limits.header_bytes {
            return Err(ParseError::HeaderLimit);
        }
        let (name, value) = split_header_line(line)?;
        self.request.headers.insert(name, value);
        Ok(())
    }

    fn begin_body(&mut self) -> Result<(), ParseError> {
        let framing = determine_framing(&self.request.headers)?;
        self.framing = Some(framing);
        match framing {
            Framing::None => {
                self.request.content_length = 0;
                self.finish();
            }
            Framing::Fixed(n) => {
                if n > self.limits.body_bytes {
                    return Err(ParseError::BodyLimit);
                }
                self.request.content_length = n;
                self.body_remaining = n;
                self.state = ParserState::BodyFixed;
                if n == 0 {
                    self.finish();
                }
            }
            Framing::Chunked => {
                self.state = ParserState::BodyChunkedSize;
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.request.body = mem::take(&mut self.body).freeze();
        if matches!(self.framing, Some(Framing::Chunked)) {
            self.request.content_length = self.request.body.len();
        }
        self.state = ParserState::Completed;
    }

    fn take_request(&mut self) -> Request {
        mem::replace(&mut self.request, Request::empty())
    }
}

struct RequestLine {
    method: Method,
    version: Version,
    scheme: Scheme,
    host: Vec<u8>,
    port: u16,
    path: Vec<u8>,
    params: HashMap<String, String>,
}

impl RequestLine {
    fn parse(line: &[u8]) -> Result<Self, ParseError> {
        let (method_tok, rest) = split_once(line, b' ').ok_or(ParseError::BadMethod)?;
        if method_tok.is_empty() {
            return Err(ParseError::EmptyMethod);
        }
        let method = Method::from_token(method_tok).ok_or(ParseError::BadMethod)?;

        let (target, version_tok) = split_once(rest, b' ').ok_or(ParseError::BadVersion)?;
        if target.is_empty() {
            return Err(ParseError::BadUri);
        }
        let version = parse_version_token(version_tok)?;

        let (scheme, host, port, path, params) = parse_request_target(target)?;
        Ok(Self {
            method,
            version,
            scheme,
            host,
            port,
            path,
            params,
        })
    }
}

/// Returns the request-target token (the middle field of the request line),
/// used to populate [`Request::uri`] verbatim.
fn line_target(line: &[u8]) -> &[u8] {
    let rest = match split_once(line, b' ') {
        Some((_, rest)) => rest,
        None => return &[],
    };
    match split_once(rest, b' ') {
        Some((target, _)) => target,
        None => rest,
    }
}

fn split_once(haystack: &[u8], sep: u8) -> Option<(&[u8], &[u8])> {
    let pos = haystack.iter().position(|&b| b == sep)?;
    Some((&haystack[..pos], &haystack[pos + 1..]))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_version_token(tok: &[u8]) -> Result<Version, ParseError> {
    if tok.len() != 8 || !tok[..5].eq_ignore_ascii_case(b"HTTP/") {
        return Err(ParseError::BadVersion);
    }
    let major = tok[5];
    let dot = tok[6];
    let minor = tok[7];
    if dot != b'.' || !major.is_ascii_digit() || !minor.is_ascii_digit() {
        return Err(ParseError::BadVersion);
    }
    Version::from_digits(major - b'0', minor - b'0').ok_or(ParseError::BadVersion)
}

fn parse_request_target(
    target: &[u8],
) -> Result<(Scheme, Vec<u8>, u16, Vec<u8>, HashMap<String, String>), ParseError> {
    if target == b"*" {
        return Ok((Scheme::Unknown, Vec::new(), 0, Vec::new(), HashMap::new()));
    }
    if let Some(scheme_pos) = find_subslice(target, b"://") {
        let scheme = Scheme::from_token(&target[..scheme_pos]).ok_or(ParseError::BadScheme)?;
        let after_scheme = &target[scheme_pos + 3..];
        let authority_end = after_scheme
            .iter()
            .position(|&b| b == b'/' || b == b'?')
            .unwrap_or(after_scheme.len());
        let authority = &after_scheme[..authority_end];
        if authority.is_empty() {
            return Err(ParseError::BadHost);
        }
        let (host, port) = parse_authority(authority)?;
        let (path, params) = parse_path_and_query(&after_scheme[authority_end..])?;
        return Ok((scheme, host, port, path, params));
    }
    if target[0] != b'/' {
        return Err(ParseError::BadUri);
    }
    let (path, params) = parse_path_and_query(target)?;
    Ok((Scheme::Unknown, Vec::new(), 0, path, params))
}

fn parse_authority(authority: &[u8]) -> Result<(Vec<u8>, u16), ParseError> {
    if authority[0] == b'[' {
        let end = authority
            .iter()
            .position(|&b| b == b']')
            .ok_or(ParseError::BadHost)?;
        let host = authority[..=end].to_vec();
        let remainder = &authority[end + 1..];
        let port = if remainder.is_empty() {
            0
        } else if remainder[0] == b':' {
            parse_port(&remainder[1..])?
        } else {
            return Err(ParseError::BadHost);
        };
        return Ok((host, port));
    }
    match authority.iter().position(|&b| b == b':') {
        Some(colon) => {
            let host = &authority[..colon];
            if host.is_empty() {
                return Err(ParseError::BadHost);
            }
            let port = parse_port(&authority[colon + 1..])?;
            Ok((host.to_vec(), port))
        }
        None => Ok((authority.to_vec(), 0)),
    }
}

fn parse_port(bytes: &[u8]) -> Result<u16, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::BadPort);
    }
    let s = std::str::from_utf8(bytes).map_err(|_| ParseError::BadPort)?;
    s.parse::<u16>().map_err(|_| ParseError::BadPort)
}

fn parse_path_and_query(rest: &[u8]) -> Result<(Vec<u8>, HashMap<String, String>), ParseError> {
    if rest.is_empty() {
        return Ok((b"/".to_vec(), HashMap::new()));
    }
    let (path_part, query_part) = match rest.iter().position(|&b| b == b'?') {
        Some(p) => (&rest[..p], Some(&rest[p + 1..])),
        None => (rest, None),
    };
    for &b in path_part {
        if b < 0x20 || b == 0x7f {
            return Err(ParseError::BadPath);
        }
    }
    let params = match query_part {
        Some(q) => parse_query(q)?,
        None => HashMap::new(),
    };
    Ok((path_part.to_vec(), params))
}

fn parse_query(q: &[u8]) -> Result<HashMap<String, String>, ParseError> {
    for &b in q {
        if b < 0x20 || b == 0x7f {
            return Err(ParseError::BadParams);
        }
    }
    let mut params = HashMap::new();
    for segment in q.split(|&b| b == b'&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.iter().position(|&b| b == b'=') {
            Some(i) => (&segment[..i], &segment[i + 1..]),
            None => (segment, &[][..]),
        };
        if key.is_empty() {
            // A bare `=` (or `=value` with no key) carries no usable pair.
            continue;
        }
        let key = std::str::from_utf8(key)
            .map_err(|_| ParseError::BadParams)?
            .to_owned();
        let value = std::str::from_utf8(value)
            .map_err(|_| ParseError::BadParams)?
            .to_owned();
        params.insert(key, value);
    }
    Ok(params)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

fn validate_header_line(line: &[u8]) -> Result<(), ParseError> {
    split_header_line(line).map(|_| ())
}

fn split_header_line(line: &[u8]) -> Result<(String, String), ParseError> {
    if line.first().is_some_and(|&b| b == b' ' || b == b'\t') {
        return Err(ParseError::BadObsFold);
    }
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(ParseError::BadHeader)?;
    let name = &line[..colon];
    if name.is_empty() {
        return Err(ParseError::EmptyHeaderName);
    }
    if !name.iter().all(|&b| is_tchar(b)) {
        return Err(ParseError::BadHeaderName);
    }
    let raw_value = &line[colon + 1..];
    let trimmed = trim_ows(raw_value);
    let name = std::str::from_utf8(name)
        .map_err(|_| ParseError::BadHeaderName)?
        .to_owned();
    let value = std::str::from_utf8(trimmed)
        .map_err(|_| ParseError::BadHeaderValue)?
        .to_owned();
    Ok((name, value))
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b != b' ' && b != b'\t') {
        None => &[],
        Some(start) => {
            let end = bytes
                .iter()
                .rposition(|&b| b != b' ' && b != b'\t')
                .expect("start existing implies an end exists");
            &bytes[start..=end]
        }
    }
}

fn determine_framing(headers: &HeaderMap) -> Result<Framing, ParseError> {
    let te_values: Vec<&str> = headers.get_all("transfer-encoding").collect();
    let has_chunked = if te_values.is_empty() {
        false
    } else {
        let combined = te_values.join(",");
        combined
            .rsplit(',')
            .next()
            .map(|tok| tok.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false)
    };

    let cl_count = headers.distinct_values("content-length");

    if has_chunked {
        // A Content-Length alongside a chunked Transfer-Encoding is a hard
        // error (request smuggling risk), not merely ignored.
        if cl_count > 0 {
            return Err(ParseError::BadTransferEncoding);
        }
        return Ok(Framing::Chunked);
    }

    if cl_count == 0 {
        return Ok(Framing::None);
    }
    if cl_count > 1 {
        return Err(ParseError::MultipleContentLength);
    }
    let raw = headers.get("content-length").expect("cl_count == 1");
    let n: usize = raw.trim().parse().map_err(|_| ParseError::BadContentLength)?;
    Ok(Framing::Fixed(n))
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, ParseError> {
    let size_tok = match line.iter().position(|&b| b == b';') {
        Some(i) => &line[..i],
        None => line,
    };
    if size_tok.is_empty() || size_tok.len() > 16 {
        return Err(ParseError::BadChunk);
    }
    let s = std::str::from_utf8(size_tok).map_err(|_| ParseError::BadChunk)?;
    u64::from_str_radix(s, 16)
        .map_err(|_| ParseError::BadChunk)?
        .try_into()
        .map_err(|_| ParseError::BadChunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8], limits: Limits) -> Request {
        let mut parser = RequestParser::new(limits);
        let mut offset = 0;
        loop {
            let (consumed, outcome) = parser.parse(&input[offset..]).expect("parse ok");
            offset += consumed;
            if let ParseOutcome::Complete(req) = outcome {
                assert_eq!(offset, input.len(), "must consume exactly the input");
                return *req;
            }
            assert!(offset < input.len(), "need-more with no more input to give");
        }
    }

    #[test]
    fn s1_simple_get() {
        let req = parse_all(
            b"GET /hello?x=1&y=2 HTTP/1.1\r\nHost: a.b\r\n\r\n",
            Limits::default(),
        );
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.version(), Version::Http11);
        assert_eq!(req.path(), b"/hello");
        assert_eq!(req.param("x"), Some("1"));
        assert_eq!(req.param("y"), Some("2"));
        assert_eq!(req.headers().get("host"), Some("a.b"));
        assert_eq!(req.content_length(), 0);
    }

    #[test]
    fn s2_post_with_body() {
        let req = parse_all(
            b"POST /p HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello",
            Limits::default(),
        );
        assert_eq!(req.body(), b"hello");
        assert_eq!(req.content_length(), 5);
    }

    #[test]
    fn s3_chunked() {
        let req = parse_all(
            b"POST /c HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
            Limits::default(),
        );
        assert_eq!(req.body(), b"hello world");
    }

    #[test]
    fn s4_split_one_byte_at_a_time() {
        let input = b"GET /hello?x=1&y=2 HTTP/1.1\r\nHost: a.b\r\n\r\n";
        let mut parser = RequestParser::new(Limits::default());
        let mut need_more_calls = 0;
        let mut offset = 0;
        loop {
            let chunk = &input[offset..(offset + 1).min(input.len())];
            let (consumed, outcome) = parser.parse(chunk).expect("parse ok");
            offset += consumed;
            match outcome {
                ParseOutcome::NeedMore => need_more_calls += 1,
                ParseOutcome::Complete(req) => {
                    assert_eq!(offset, input.len());
                    assert_eq!(req.path(), b"/hello");
                    assert_eq!(req.param("x"), Some("1"));
                    assert!(need_more_calls > 0);
                    return;
                }
            }
        }
    }

    #[test]
    fn s5_duplicate_content_length() {
        let mut parser = RequestParser::new(Limits::default());
        let input = b"POST /p HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\nContent-Length: 6\r\n\r\n";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::MultipleContentLength);
    }

    #[test]
    fn s6_bare_lf_is_bad_line_ending() {
        let mut parser = RequestParser::new(Limits::default());
        let err = parser.parse(b"GET / HTTP/1.1\nHost: x\n\n").unwrap_err();
        assert_eq!(err, ParseError::BadLineEnding);
    }

    #[test]
    fn stale_after_error() {
        let mut parser = RequestParser::new(Limits::default());
        let _ = parser.parse(b"GET / HTTP/1.1\nHost: x\n\n");
        let err = parser.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::StaleParser);
    }

    #[test]
    fn both_content_length_and_chunked_rejected() {
        let mut parser = RequestParser::new(Limits::default());
        let input = b"POST /p HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\nTransfer-Encoding: chunked\r\n\r\nhello";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::BadTransferEncoding);
    }

    #[test]
    fn absolute_form_target() {
        let req = parse_all(
            b"GET http://example.com:8080/a/b?c=d HTTP/1.1\r\nHost: example.com\r\n\r\n",
            Limits::default(),
        );
        assert_eq!(req.scheme(), Scheme::Http);
        assert_eq!(req.host(), b"example.com");
        assert_eq!(req.port(), 8080);
        assert_eq!(req.path(), b"/a/b");
        assert_eq!(req.param("c"), Some("d"));
    }

    #[test]
    fn asterisk_form_target() {
        let req = parse_all(b"OPTIONS * HTTP/1.1\r\nHost: h\r\n\r\n", Limits::default());
        assert_eq!(req.uri(), b"*");
        assert_eq!(req.path(), b"");
    }

    #[test]
    fn case_insensitive_header_lookup() {
        let req = parse_all(b"GET / HTTP/1.1\r\nHOST: a.b\r\n\r\n", Limits::default());
        assert_eq!(req.headers().get("host"), Some("a.b"));
        assert_eq!(req.headers().get("Host"), Some("a.b"));
    }

    #[test]
    fn bare_equals_ignored_in_query() {
        let req = parse_all(b"GET /p?=&a=1 HTTP/1.1\r\nHost: h\r\n\r\n", Limits::default());
        assert_eq!(req.param("a"), Some("1"));
        assert_eq!(req.params().len(), 1);
    }

    #[test]
    fn control_byte_in_query_rejected() {
        let mut parser = RequestParser::new(Limits::default());
        let input = b"GET /p?a=1\t2 HTTP/1.1\r\nHost: h\r\n\r\n";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::BadParams);
    }

    #[test]
    fn huge_chunk_size_does_not_overflow_the_body_limit_check() {
        let mut limits = Limits::default();
        limits.body_bytes = 1024;
        let mut parser = RequestParser::new(limits);
        // A small first chunk makes `self.body.len()` nonzero, so a second
        // chunk whose declared size is close to `usize::MAX` would overflow
        // a naive `body.len() + size` addition instead of hitting the limit.
        let input = b"POST /p HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\nffffffffffffffff\r\n";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::BodyLimit);
    }

    #[test]
    fn chunked_trailers_are_bounded_by_header_count() {
        let mut limits = Limits::default();
        // Exactly enough for the two request headers (Host, Transfer-Encoding);
        // any trailer line must push this over the limit.
        limits.header_count = 2;
        let mut parser = RequestParser::new(limits);
        let input =
            b"POST /p HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nX-A: 1\r\nX-B: 2\r\n\r\n";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::HeaderLimit);
    }

    #[test]
    fn obs_fold_rejected() {
        let mut parser = RequestParser::new(Limits::default());
        let input = b"GET / HTTP/1.1\r\nHost: a\r\n b\r\n\r\n";
        let err = loop {
            match parser.parse(input) {
                Ok((_, ParseOutcome::NeedMore)) => continue,
                Ok((_, ParseOutcome::Complete(_))) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert_eq!(err, ParseError::BadObsFold);
    }

    #[test]
    fn reset_allows_reuse() {
        let mut parser = RequestParser::new(Limits::default());
        let _ = parse_all(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n", Limits::default());
        parser.reset();
        assert_eq!(parser.state(), ParserState::NothingYet);
    }

    /// Feeds `input` to a fresh parser one byte at a time and returns the
    /// parsed request, asserting every byte is consumed and no split point
    /// changes the outcome (invariant 1: byte-boundary independence).
    fn parse_byte_at_a_time(input: &[u8]) -> Request {
        let mut parser = RequestParser::new(Limits::default());
        let mut offset = 0;
        while offset < input.len() {
            let (consumed, outcome) = parser
                .parse(&input[offset..offset + 1])
                .expect("parse ok");
            assert_eq!(consumed, 1);
            offset += 1;
            if let ParseOutcome::Complete(req) = outcome {
                assert_eq!(offset, input.len());
                return *req;
            }
        }
        panic!("ran out of input before the parser completed");
    }

    proptest::proptest! {
        #[test]
        fn byte_boundary_independence_for_query_pairs(
            pairs in proptest::collection::vec(
                ("[a-z]{1,6}", "[a-z0-9]{0,6}"),
                0..5,
            ),
        ) {
            let query = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            let whole = format!("GET /p?{query} HTTP/1.1\r\nHost: h\r\n\r\n");

            let whole_req = parse_all(whole.as_bytes(), Limits::default());
            let incremental_req = parse_byte_at_a_time(whole.as_bytes());

            proptest::prop_assert_eq!(whole_req.path(), incremental_req.path());
            proptest::prop_assert_eq!(whole_req.params().len(), incremental_req.params().len());
            for (k, v) in whole_req.params() {
                proptest::prop_assert_eq!(incremental_req.param(k), Some(v.as_str()));
            }
        }

        #[test]
        fn byte_boundary_independence_for_headers(
            headers in proptest::collection::vec(("[A-Za-z-]{1,10}", "[a-zA-Z0-9 ]{0,12}"), 0..4),
        ) {
            let mut raw = String::from("GET /x HTTP/1.1\r\nHost: h\r\n");
            for (name, value) in &headers {
                raw.push_str(&format!("{name}: {value}\r\n"));
            }
            raw.push_str("\r\n");

            let whole_req = parse_all(raw.as_bytes(), Limits::default());
            let incremental_req = parse_byte_at_a_time(raw.as_bytes());

            for (name, _) in &headers {
                proptest::prop_assert_eq!(
                    whole_req.headers().get(name),
                    incremental_req.headers().get(name)
                );
            }
        }
    }
}
