//! Parser for the two textual spectrum literals.
//!
//! * bracketed: `[[100, 1], [200, 2]]`, `[(100, 1), (200, 2)]` or `{{100, 1}, {200, 2}}`,
//!   one tuple bracket style per literal
//! * colon: `100:1 200:2`, with peaks separated by whitespace and/or one `,` or `;`
//!
//! Printing is the `Display` impl of [`Spectrum`], which always emits the colon form.

use crate::data::spectrum::{Peak, Spectrum};
use crate::errors::SpectrumError;

/// Parses a spectrum literal in either syntax.
///
/// # Example
///
/// ```rust
/// # use mscosine::data::literal::parse_spectrum;
/// let a = parse_spectrum("[[200, 2], [100, 1]]").unwrap();
/// let b = parse_spectrum("100:1, 200:2").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_spectrum("100:1 200").is_err());
/// ```
pub fn parse_spectrum(input: &str) -> Result<Spectrum, SpectrumError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_blank();

    let peaks = match cursor.peek() {
        Some(b'[') | Some(b'{') => cursor.bracketed()?,
        _ => cursor.colon_separated()?,
    };

    Ok(Spectrum::from_peaks(peaks))
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self) -> SpectrumError {
        SpectrumError::malformed_literal(self.pos)
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), SpectrumError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Reads one float, skipping leading whitespace.
    ///
    /// The token runs up to the next delimiter or whitespace; it must be a complete
    /// `f32`. Tokens that only become infinite by overflowing are rejected, while an
    /// explicit `inf` is accepted.
    fn float(&mut self) -> Result<f32, SpectrumError> {
        self.skip_blank();
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || is_delimiter(c) {
                break;
            }
            self.pos += 1;
        }

        let token = &self.input[start..self.pos];
        let value: f32 = token
            .parse()
            .map_err(|_| SpectrumError::malformed_literal(start))?;

        if value.is_infinite() && !names_infinity(token) {
            return Err(SpectrumError::malformed_literal(start));
        }

        Ok(value)
    }

    fn bracketed(&mut self) -> Result<Vec<Peak>, SpectrumError> {
        let outer_open = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;

        let outer_close = closing(outer_open);
        let mut peaks = Vec::new();

        self.skip_blank();
        if self.peek() == Some(outer_close) {
            self.pos += 1;
            return self.finish(peaks);
        }

        // the first tuple fixes the bracket every following tuple must use
        let mut tuple_open = None;

        loop {
            self.skip_blank();

            let open = self.peek().ok_or_else(|| self.error())?;
            let valid_open = match (outer_open, tuple_open) {
                (_, Some(first)) => open == first,
                (b'[', None) => open == b'[' || open == b'(',
                _ => open == b'{',
            };
            if !valid_open {
                return Err(self.error());
            }
            tuple_open = Some(open);
            self.pos += 1;

            let mz = self.float()?;
            self.skip_blank();
            self.expect(b',')?;
            let intensity = self.float()?;
            self.skip_blank();
            self.expect(closing(open))?;

            peaks.push(Peak::new(mz, intensity));

            self.skip_blank();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == outer_close => {
                    self.pos += 1;
                    return self.finish(peaks);
                }
                _ => return Err(self.error()),
            }
        }
    }

    fn colon_separated(&mut self) -> Result<Vec<Peak>, SpectrumError> {
        let mut peaks = Vec::new();

        while !self.at_end() {
            let mz = self.float()?;
            self.skip_blank();
            self.expect(b':')?;
            let intensity = self.float()?;
            peaks.push(Peak::new(mz, intensity));

            let had_blank = matches!(self.peek(), Some(c) if c.is_ascii_whitespace());
            self.skip_blank();

            match self.peek() {
                None => break,
                Some(b',') | Some(b';') => {
                    self.pos += 1;
                    // a separator must be followed by another peak
                    self.skip_blank();
                    if self.at_end() {
                        return Err(self.error());
                    }
                }
                Some(_) if had_blank => {}
                Some(_) => return Err(self.error()),
            }
        }

        Ok(peaks)
    }

    fn finish(&mut self, peaks: Vec<Peak>) -> Result<Vec<Peak>, SpectrumError> {
        self.skip_blank();
        if self.at_end() {
            Ok(peaks)
        } else {
            Err(self.error())
        }
    }
}

fn is_delimiter(c: u8) -> bool {
    matches!(c, b',' | b';' | b':' | b'[' | b']' | b'(' | b')' | b'{' | b'}')
}

fn closing(open: u8) -> u8 {
    match open {
        b'[' => b']',
        b'(' => b')',
        _ => b'}',
    }
}

fn names_infinity(token: &str) -> bool {
    token
        .trim_start_matches(['+', '-'])
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("inf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(spectrum: &Spectrum) -> Vec<(f32, f32)> {
        spectrum.peaks().map(|p| (p.mz, p.intensity)).collect()
    }

    #[test]
    fn test_square_brackets() {
        let spectrum = parse_spectrum(" [ [200.5, 2] , [100, 1.5] ] ").unwrap();
        assert_eq!(pairs(&spectrum), vec![(100.0, 1.5), (200.5, 2.0)]);
    }

    #[test]
    fn test_parenthesised_tuples() {
        let spectrum = parse_spectrum("[(100, 1), (200, 2)]").unwrap();
        assert_eq!(pairs(&spectrum), vec![(100.0, 1.0), (200.0, 2.0)]);
    }

    #[test]
    fn test_curly_braces() {
        let spectrum = parse_spectrum("{{100,1},{200,2}}").unwrap();
        assert_eq!(spectrum.len(), 2);
    }

    #[test]
    fn test_empty_literals() {
        assert!(parse_spectrum("[]").unwrap().is_empty());
        assert!(parse_spectrum("{ }").unwrap().is_empty());
        assert!(parse_spectrum("").unwrap().is_empty());
        assert!(parse_spectrum("   ").unwrap().is_empty());
    }

    #[test]
    fn test_colon_separators() {
        let expected = vec![(100.0, 1.0), (200.0, 2.0), (300.0, 3.0)];
        for text in [
            "100:1 200:2 300:3",
            "100:1,200:2;300:3",
            "100:1 , 200:2 ;300:3",
            "  100 : 1\n200:2\t300:3  ",
        ] {
            assert_eq!(pairs(&parse_spectrum(text).unwrap()), expected, "{}", text);
        }
    }

    #[test]
    fn test_malformed_bracketed() {
        for text in [
            "[[100, 1]",
            "[[100, 1]] trailing",
            "[[100 1]]",
            "[[100, 1], ]",
            "[[100, abc]]",
            "[{100, 1}]",
            "{[100, 1]}",
            "[[100, 1) ]",
            "[[100, 1], (200, 2)]",
            "[(100, 1), [200, 2]]",
        ] {
            assert!(parse_spectrum(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_malformed_colon() {
        for text in ["100:1 200", "100:1,", "100:1;;200:2", "100:12:3", "100 1", ":1", "100:x"] {
            assert!(parse_spectrum(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_error_position() {
        assert_eq!(
            parse_spectrum("100:1 200"),
            Err(SpectrumError::MalformedLiteral { position: 9 })
        );
        assert_eq!(
            parse_spectrum("[[1,2],(3,4)]"),
            Err(SpectrumError::MalformedLiteral { position: 7 })
        );
    }

    #[test]
    fn test_overflow_is_malformed() {
        assert!(parse_spectrum("1e40:1").is_err());
        let spectrum = parse_spectrum("inf:1 -Infinity:2").unwrap();
        assert_eq!(spectrum.mz()[0], f32::NEG_INFINITY);
        assert_eq!(spectrum.mz()[1], f32::INFINITY);
    }

    #[test]
    fn test_exponent_notation() {
        let spectrum = parse_spectrum("1.5e2:2E-3").unwrap();
        assert_eq!(pairs(&spectrum), vec![(150.0, 0.002)]);
    }
}
