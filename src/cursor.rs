//! Byte cursor over a borrowed buffer.
//!
//! The cursor never owns the bytes it scans. Partial progress is undone with an explicit
//! [`Checkpoint`], so a parser can try a unit, find the input short, and hand every byte back.

/// Position returned by [`Cursor::mark`], consumed by [`Cursor::rewind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

/// Read position over a byte slice.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create cursor at the start of `buf`.
    #[inline]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Remaining bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes consumed since creation.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes without consuming them.
    #[inline]
    pub fn peek(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    pub fn first(&self) -> Option<u8> {
        self.peek().first().copied()
    }

    #[inline]
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.peek().starts_with(pat)
    }

    /// Advance by at most `n` bytes.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        self.pos += n.min(self.len());
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        let byte = self.first()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consume and return at most `n` bytes.
    pub fn take(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.len());
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        out
    }

    // ===== Mark / Rewind =====

    #[inline]
    pub const fn mark(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    /// Restore the position to `cp`.
    ///
    /// A checkpoint from a later position than the current one is ignored.
    #[inline]
    pub fn rewind(&mut self, cp: Checkpoint) {
        if cp.0 <= self.pos {
            self.pos = cp.0;
        }
    }

    /// Bytes consumed since `cp`.
    #[inline]
    pub fn since(&self, cp: Checkpoint) -> &'a [u8] {
        &self.buf[cp.0.min(self.pos)..self.pos]
    }

    #[inline]
    pub fn mark_len(&self, cp: Checkpoint) -> usize {
        self.pos.saturating_sub(cp.0)
    }

    // ===== Scanning =====

    /// Consume everything before `pat`, and `pat` itself when `eat` is set.
    ///
    /// Returns the bytes before the pattern, or `None` without consuming anything if the pattern
    /// is not present in the remaining input.
    pub fn consume_until(&mut self, pat: &[u8], eat: bool) -> Option<&'a [u8]> {
        let at = find(self.peek(), pat)?;
        let data = self.take(at);
        if eat {
            self.consume(pat.len());
        }
        Some(data)
    }

    /// Consume data up to `pat`.
    ///
    /// Unlike [`consume_until`][Self::consume_until], when the pattern is not found this still
    /// consumes the longest prefix that cannot be the start of a match. A tail that could be the
    /// beginning of `pat` is left in place. The flag reports whether the full pattern was found.
    pub fn consume_boundary(&mut self, pat: &[u8], eat: bool) -> (&'a [u8], bool) {
        if let Some(data) = self.consume_until(pat, eat) {
            return (data, true);
        }
        let rest = self.peek();
        let keep = partial_suffix(rest, pat);
        (self.take(rest.len() - keep), false)
    }

    /// Split the remaining bytes on `delim` into at most `max_parts` sub-cursors.
    ///
    /// The last part holds everything after the last split point, delimiters included. A
    /// `max_parts` of zero means no limit. Does not consume.
    pub fn split(&self, delim: u8, max_parts: usize) -> Vec<Cursor<'a>> {
        let rest = self.peek();
        let mut parts = Vec::new();
        let mut start = 0;
        for (i, &b) in rest.iter().enumerate() {
            if max_parts != 0 && parts.len() + 1 == max_parts {
                break;
            }
            if b == delim {
                parts.push(Cursor::new(&rest[start..i]));
                start = i + 1;
            }
        }
        parts.push(Cursor::new(&rest[start..]));
        parts
    }

    /// Cursor over at most the first `n` remaining bytes.
    pub fn limit(&self, n: usize) -> Cursor<'a> {
        let end = self.pos + n.min(self.len());
        Cursor { buf: &self.buf[..end], pos: self.pos }
    }

    // ===== Integers =====

    /// Read an unsigned integer in `radix`, consuming its digits.
    ///
    /// Returns `None` and consumes nothing when there is no digit or the value overflows.
    pub fn read_uint(&mut self, radix: u32) -> Option<u64> {
        let digits = self
            .peek()
            .iter()
            .take_while(|b| (**b as char).is_digit(radix))
            .count();
        if digits == 0 {
            return None;
        }
        let mut value: u64 = 0;
        for &b in &self.peek()[..digits] {
            let d = (b as char).to_digit(radix)?;
            value = value.checked_mul(radix as u64)?.checked_add(d as u64)?;
        }
        self.consume(digits);
        Some(value)
    }

    /// Consume SP and HTAB, returning how many were skipped.
    pub fn consume_whitespace(&mut self) -> usize {
        let n = self.peek().iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
        self.consume(n);
        n
    }
}

/// Position of the first occurrence of `pat` in `hay`.
pub(crate) fn find(hay: &[u8], pat: &[u8]) -> Option<usize> {
    if pat.is_empty() {
        return Some(0);
    }
    if hay.len() < pat.len() {
        return None;
    }
    hay.windows(pat.len()).position(|w| w == pat)
}

/// Length of the longest suffix of `hay` that is a proper prefix of `pat`.
fn partial_suffix(hay: &[u8], pat: &[u8]) -> usize {
    let max = pat.len().saturating_sub(1).min(hay.len());
    (1..=max)
        .rev()
        .find(|&k| hay[hay.len() - k..] == pat[..k])
        .unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mark_rewind() {
        let mut cur = Cursor::new(b"hello world");
        let cp = cur.mark();
        cur.consume(5);
        assert_eq!(cur.since(cp), b"hello");
        assert_eq!(cur.mark_len(cp), 5);

        let inner = cur.mark();
        cur.consume(3);
        cur.rewind(inner);
        assert_eq!(cur.peek(), b" world");

        cur.rewind(cp);
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_consume_until() {
        let mut cur = Cursor::new(b"GET / HTTP/1.1\r\nHost");
        assert_eq!(cur.consume_until(b"\r\n", true), Some(&b"GET / HTTP/1.1"[..]));
        assert_eq!(cur.peek(), b"Host");
        assert_eq!(cur.consume_until(b"\r\n", true), None);
        assert_eq!(cur.peek(), b"Host");
    }

    #[test]
    fn test_consume_boundary() {
        macro_rules! test {
            ($input:literal, $pat:literal => $data:literal, $found:literal, $rest:literal) => {
                let mut cur = Cursor::new($input);
                let (data, found) = cur.consume_boundary($pat, false);
                assert_eq!(data, &$data[..]);
                assert_eq!(found, $found);
                assert_eq!(cur.peek(), &$rest[..]);
            };
        }

        test!(b"abc\r\n--xy", b"\r\n--xy" => b"abc", true, b"\r\n--xy");
        test!(b"abc\r\n--x", b"\r\n--xy" => b"abc", false, b"\r\n--x");
        test!(b"abc\r", b"\r\n--xy" => b"abc", false, b"\r");
        test!(b"abc\r\n-z", b"\r\n--xy" => b"abc\r\n-z", false, b"");
        test!(b"", b"\r\n--xy" => b"", false, b"");
    }

    #[test]
    fn test_split() {
        let cur = Cursor::new(b"GET /a b HTTP/1.1");
        let parts = cur.split(b' ', 3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].peek(), b"GET");
        assert_eq!(parts[1].peek(), b"/a");
        assert_eq!(parts[2].peek(), b"b HTTP/1.1");

        let parts = cur.split(b' ', 0);
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_read_uint() {
        let mut cur = Cursor::new(b"3a;ext");
        assert_eq!(cur.read_uint(16), Some(0x3a));
        assert_eq!(cur.peek(), b";ext");

        let mut cur = Cursor::new(b"ffffffffffffffffff");
        assert_eq!(cur.read_uint(16), None);
        assert_eq!(cur.len(), 18);

        let mut cur = Cursor::new(b"x");
        assert_eq!(cur.read_uint(10), None);
    }

    #[test]
    fn test_limit() {
        let mut cur = Cursor::new(b"abcdef");
        cur.consume(1);
        let lim = cur.limit(3);
        assert_eq!(lim.peek(), b"bcd");
        assert_eq!(lim.position(), 1);
        let lim = cur.limit(100);
        assert_eq!(lim.peek(), b"bcdef");
    }
}
