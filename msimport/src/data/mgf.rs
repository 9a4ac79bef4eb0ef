use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mscosine::Spectrum;
use serde::Serialize;
use tracing::{debug, trace};

use crate::data::lines::{parse_peak_line, LineReader};
use crate::errors::ImportError;

const BEGIN_IONS: &str = "BEGIN IONS";
const END_IONS: &str = "END IONS";
const PEPMASS: &str = "PEPMASS";
const CHARGE: &str = "CHARGE";
const COMMENT_CHARS: [char; 4] = ['#', ';', '!', '/'];

/// One `BEGIN IONS` ... `END IONS` block of an MGF file.
///
/// Parameters given before the first block apply to every record unless the
/// record sets them itself. Keys are stored upper case.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MgfRecord {
    pub params: BTreeMap<String, String>,
    pub pepmass: Option<f32>,
    pub pep_intensity: Option<f32>,
    pub charge: Option<i32>,
    pub spectrum: Spectrum,
}

impl MgfRecord {
    pub fn title(&self) -> Option<&str> {
        self.params.get("TITLE").map(String::as_str)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(&key.to_ascii_uppercase()).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default)]
struct Params {
    values: BTreeMap<String, String>,
    pepmass: Option<f32>,
    pep_intensity: Option<f32>,
    charge: Option<i32>,
}

impl Params {
    fn set(&mut self, key: &str, value: &str, line: usize) -> Result<(), ImportError> {
        let key = key.to_ascii_uppercase();

        match key.as_str() {
            PEPMASS => {
                let (mass, intensity) =
                    parse_pepmass(value).ok_or(ImportError::MalformedParameter { line })?;
                self.pepmass = Some(mass);
                // an intensity inherited from the globals survives a bare mass
                if intensity.is_some() {
                    self.pep_intensity = intensity;
                }
            }
            CHARGE => {
                self.charge = Some(parse_charge(value).ok_or(ImportError::MalformedParameter { line })?);
            }
            _ => {}
        }

        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn into_record(self, peaks: Vec<(f32, f32)>) -> MgfRecord {
        MgfRecord {
            params: self.values,
            pepmass: self.pepmass,
            pep_intensity: self.pep_intensity,
            charge: self.charge,
            spectrum: Spectrum::from_pairs(peaks),
        }
    }
}

/// Streaming MGF reader, yields one record per `BEGIN IONS` block.
///
/// # Example
///
/// ```rust
/// use msimport::MgfReader;
///
/// let text = "CHARGE=2+\nBEGIN IONS\nTITLE=first\nPEPMASS=500.25 1200\n100.0 5\n90.5 2\nEND IONS\n";
/// let records = MgfReader::new(text.as_bytes()).collect::<Result<Vec<_>, _>>().unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].title(), Some("first"));
/// assert_eq!(records[0].charge, Some(2));
/// assert_eq!(records[0].spectrum.mz(), &[90.5, 100.0]);
/// ```
pub struct MgfReader<R> {
    lines: LineReader<R>,
    globals: Params,
    header_read: bool,
    failed: bool,
}

impl<R: BufRead> MgfReader<R> {
    pub fn new(inner: R) -> Self {
        MgfReader::with_source(inner, "<stream>")
    }

    pub fn with_source(inner: R, source: impl Into<String>) -> Self {
        MgfReader {
            lines: LineReader::new(inner, source),
            globals: Params::default(),
            header_read: false,
            failed: false,
        }
    }

    /// Reads global parameters up to the first `BEGIN IONS`.
    ///
    /// Returns `false` if the input ends before any record starts.
    fn read_header(&mut self) -> Result<bool, ImportError> {
        while let Some(line) = self.lines.next_line()? {
            let line = line.trim();

            if line.is_empty() || is_comment(line) {
                trace!(line = self.lines.line_number(), "skipping line");
                continue;
            }

            if line == BEGIN_IONS {
                return Ok(true);
            }

            let number = self.lines.line_number();
            let (key, value) = split_parameter(line).ok_or(ImportError::MalformedParameter { line: number })?;
            self.globals.set(key, value, number)?;
        }

        Ok(false)
    }

    /// Skips to the next `BEGIN IONS`, returns `false` at the end of input.
    fn seek_record(&mut self) -> Result<bool, ImportError> {
        while let Some(line) = self.lines.next_line()? {
            let line = line.trim();

            if line.is_empty() || is_comment(line) {
                continue;
            }

            if line == BEGIN_IONS {
                return Ok(true);
            }

            return Err(ImportError::UnexpectedLine { line: self.lines.line_number() });
        }

        Ok(false)
    }

    fn read_record(&mut self) -> Result<Option<MgfRecord>, ImportError> {
        let started = if self.header_read {
            self.seek_record()?
        } else {
            self.header_read = true;
            self.read_header()?
        };

        if !started {
            return Ok(None);
        }

        let mut params = self.globals.clone();
        let mut peaks = Vec::new();

        loop {
            let line = self.lines.require_line()?;
            let line = line.trim();
            let number = self.lines.line_number();

            if line.is_empty() {
                continue;
            }

            if line == END_IONS {
                break;
            }

            // parameters precede the peak list
            if peaks.is_empty() {
                if let Some((key, value)) = split_parameter(line) {
                    params.set(key, value, number)?;
                    continue;
                }
            }

            peaks.push(parse_peak_line(line, number)?);
        }

        debug!(peaks = peaks.len(), line = self.lines.line_number(), "read mgf record");

        Ok(Some(params.into_record(peaks)))
    }
}

impl<R: BufRead> Iterator for MgfReader<R> {
    type Item = Result<MgfRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads every record of an MGF stream.
pub fn read_mgf<R: BufRead>(reader: R) -> Result<Vec<MgfRecord>, ImportError> {
    MgfReader::new(reader).collect()
}

/// Reads every record of an MGF file.
pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<MgfRecord>, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ImportError::io(path, e))?;

    MgfReader::with_source(BufReader::new(file), path.to_string_lossy()).collect()
}

fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT_CHARS)
}

fn split_parameter(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();

    if key.is_empty() {
        None
    } else {
        Some((key, value.trim()))
    }
}

/// `mass [intensity]`
fn parse_pepmass(value: &str) -> Option<(f32, Option<f32>)> {
    let mut tokens = value.split_whitespace();

    let mass = tokens.next()?.parse().ok()?;
    let intensity = match tokens.next() {
        Some(token) => Some(token.parse().ok()?),
        None => None,
    };

    if tokens.next().is_some() {
        return None;
    }

    Some((mass, intensity))
}

/// Accepts `2`, `+2`, `2+`, `-3` and `3-`.
fn parse_charge(value: &str) -> Option<i32> {
    let value = value.trim();

    if let Some(digits) = value.strip_suffix('+') {
        digits.parse().ok()
    } else if let Some(digits) = value.strip_suffix('-') {
        digits.parse::<i32>().ok().map(|c| -c)
    } else {
        value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = "\
# exported spectra
COM=test library
CHARGE=1+

BEGIN IONS
TITLE=alpha
PEPMASS=301.1
120.5 10
101.0 3.5
END IONS

BEGIN IONS
TITLE=beta
CHARGE=3-
PEPMASS=512.75 4400
200 1
END IONS
";

    #[test]
    fn test_reads_records_with_globals() {
        let records = read_mgf(TWO_RECORDS.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let alpha = &records[0];
        assert_eq!(alpha.title(), Some("alpha"));
        assert_eq!(alpha.charge, Some(1));
        assert_eq!(alpha.pepmass, Some(301.1));
        assert_eq!(alpha.pep_intensity, None);
        assert_eq!(alpha.param("com"), Some("test library"));
        assert_eq!(alpha.spectrum.mz(), &[101.0, 120.5]);
        assert_eq!(alpha.spectrum.intensity(), &[3.5, 10.0]);

        let beta = &records[1];
        assert_eq!(beta.charge, Some(-3));
        assert_eq!(beta.pep_intensity, Some(4400.0));
        assert_eq!(beta.spectrum.len(), 1);
    }

    #[test]
    fn test_record_pepmass_keeps_global_intensity() {
        let text = "PEPMASS=400 900\nBEGIN IONS\nPEPMASS=600\nEND IONS\nBEGIN IONS\nPEPMASS=700 50\nEND IONS\n";
        let records = read_mgf(text.as_bytes()).unwrap();

        assert_eq!(records[0].pepmass, Some(600.0));
        assert_eq!(records[0].pep_intensity, Some(900.0));
        assert_eq!(records[1].pepmass, Some(700.0));
        assert_eq!(records[1].pep_intensity, Some(50.0));
    }

    #[test]
    fn test_empty_input_has_no_records() {
        assert!(read_mgf("".as_bytes()).unwrap().is_empty());
        assert!(read_mgf("# nothing here\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_record() {
        let records = read_mgf("BEGIN IONS\nEND IONS\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].spectrum.is_empty());
    }

    #[test]
    fn test_global_line_without_separator() {
        let err = read_mgf("not a parameter\nBEGIN IONS\nEND IONS\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MalformedParameter { line: 1 }));
    }

    #[test]
    fn test_parameter_after_peaks() {
        let err = read_mgf("BEGIN IONS\n100 1\nTITLE=late\nEND IONS\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MalformedPeak { line: 3 }));
    }

    #[test]
    fn test_missing_end() {
        let err = read_mgf("BEGIN IONS\n100 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::UnexpectedEof));
    }

    #[test]
    fn test_garbage_between_records() {
        let text = "BEGIN IONS\nEND IONS\nstray\nBEGIN IONS\nEND IONS\n";
        let mut reader = MgfReader::new(text.as_bytes());

        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(ImportError::UnexpectedLine { line: 3 }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_bad_charge() {
        let err = read_mgf("BEGIN IONS\nCHARGE=two\nEND IONS\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MalformedParameter { line: 2 }));
    }

    #[test]
    fn test_charge_forms() {
        assert_eq!(parse_charge("2+"), Some(2));
        assert_eq!(parse_charge("+2"), Some(2));
        assert_eq!(parse_charge(" 3- "), Some(-3));
        assert_eq!(parse_charge("-1"), Some(-1));
        assert_eq!(parse_charge("2+ and 3+"), None);
    }

    #[test]
    fn test_pepmass_forms() {
        assert_eq!(parse_pepmass("400.5"), Some((400.5, None)));
        assert_eq!(parse_pepmass("400.5  12"), Some((400.5, Some(12.0))));
        assert_eq!(parse_pepmass("400.5 12 1"), None);
        assert_eq!(parse_pepmass(""), None);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = from_path("/definitely/not/here.mgf").unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
