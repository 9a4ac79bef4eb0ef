use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mscosine::Spectrum;
use serde::Serialize;
use tracing::debug;

use crate::data::lines::{parse_peak_line, LineReader};
use crate::errors::ImportError;

const RECORD_END: &str = "$$$$";

/// One `$$$$`-terminated record of an SD file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SdfRecord {
    /// The lines before the first property header, each followed by `\n`.
    pub molfile: String,
    /// Data items other than the spectrum, multi-line values joined by `\n`.
    pub properties: BTreeMap<String, String>,
    /// The peak list found under the designated property, if the record has one.
    pub spectrum: Option<Spectrum>,
}

/// Streaming SDF reader.
///
/// The data item named `spectrum_field` is read as a list of `mass intensity`
/// lines; every other data item is kept as text.
pub struct SdfReader<R> {
    lines: LineReader<R>,
    spectrum_field: String,
    failed: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(inner: R, spectrum_field: impl Into<String>) -> Self {
        SdfReader::with_source(inner, spectrum_field, "<stream>")
    }

    pub fn with_source(inner: R, spectrum_field: impl Into<String>, source: impl Into<String>) -> Self {
        SdfReader {
            lines: LineReader::new(inner, source),
            spectrum_field: spectrum_field.into(),
            failed: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<SdfRecord>, ImportError> {
        let mut molfile = String::new();

        // molfile block, the first line may legitimately be blank
        let mut line = loop {
            let Some(line) = self.lines.next_line()? else {
                if molfile.trim().is_empty() {
                    return Ok(None);
                }
                return Err(ImportError::UnexpectedEof);
            };

            if property_name(&line).is_some() || line == RECORD_END {
                break line;
            }

            molfile.push_str(&line);
            molfile.push('\n');
        };

        let mut properties = BTreeMap::new();
        let mut spectrum = None;

        while let Some(name) = property_name(&line).map(str::to_string) {
            if name == self.spectrum_field {
                let mut peaks = Vec::new();
                loop {
                    let value = self.lines.require_line()?;
                    if value.trim().is_empty() {
                        break;
                    }
                    peaks.push(parse_peak_line(&value, self.lines.line_number())?);
                }
                spectrum = Some(Spectrum::from_pairs(peaks));
            } else {
                let mut value = Vec::new();
                loop {
                    let text = self.lines.require_line()?;
                    if text.is_empty() {
                        break;
                    }
                    value.push(text);
                }
                if !value.is_empty() {
                    properties.insert(name, value.join("\n"));
                }
            }

            line = self.lines.require_line()?;
        }

        if line != RECORD_END {
            return Err(ImportError::UnexpectedLine { line: self.lines.line_number() });
        }

        debug!(properties = properties.len(), line = self.lines.line_number(), "read sdf record");

        Ok(Some(SdfRecord { molfile, properties, spectrum }))
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<SdfRecord, ImportError>;

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

/// Reads every record of an SDF stream.
///
/// # Example
///
/// ```rust
/// use msimport::read_sdf;
///
/// let text = "caffeine\n\n\n>  <NAME>\nCaffeine\n\n>  <MASS SPECTRAL PEAKS>\n195.1 100\n138.0 40\n\n$$$$\n";
/// let records = read_sdf(text.as_bytes(), "MASS SPECTRAL PEAKS").unwrap();
///
/// assert_eq!(records[0].properties["NAME"], "Caffeine");
/// assert_eq!(records[0].spectrum.as_ref().map(|s| s.len()), Some(2));
/// ```
pub fn read_sdf<R: BufRead>(reader: R, spectrum_field: &str) -> Result<Vec<SdfRecord>, ImportError> {
    SdfReader::new(reader, spectrum_field).collect()
}

/// Reads every record of an SDF file.
pub fn from_path(path: impl AsRef<Path>, spectrum_field: &str) -> Result<Vec<SdfRecord>, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ImportError::io(path, e))?;

    SdfReader::with_source(BufReader::new(file), spectrum_field, path.to_string_lossy()).collect()
}

/// Name of a data header line such as `>  <NAME>` or `> <NAME>`.
fn property_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?.trim_start();
    rest.strip_prefix('<')?.strip_suffix('>')
}
