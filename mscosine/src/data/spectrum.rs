use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::data::literal::parse_spectrum;
use crate::errors::SpectrumError;

/// Size in bytes of the total-length header that prefixes the binary layout.
pub const HEADER_SIZE: usize = 4;

/// A single (m/z, intensity) measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f32,
    pub intensity: f32,
}

impl Peak {
    pub fn new(mz: f32, intensity: f32) -> Self {
        Peak { mz, intensity }
    }
}

impl From<(f32, f32)> for Peak {
    fn from((mz, intensity): (f32, f32)) -> Self {
        Peak { mz, intensity }
    }
}

/// An immutable mass spectrum, sorted ascending by m/z.
///
/// Masses and intensities are kept as two parallel arrays, which is also how they
/// are laid out in the binary encoding: a little-endian `u32` holding the total
/// byte length, all masses, then all intensities. Because the masses are sorted,
/// comparing two encodings byte by byte is a meaningful structural comparison, and
/// `Eq`, `Ord` and `Hash` are all defined on those bytes.
///
/// Uses `Arc<[f32]>` so clones share storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<Peak>", into = "Vec<Peak>")]
pub struct Spectrum {
    mz: Arc<[f32]>,
    intensity: Arc<[f32]>,
}

impl Spectrum {
    /// Constructs a new `Spectrum` from parallel m/z and intensity vectors.
    ///
    /// Peaks are sorted by m/z; peaks with equal m/z keep their input order.
    ///
    /// # Arguments
    ///
    /// * `mz` - A vector of m/z values.
    /// * `intensity` - A vector of intensity values corresponding to the m/z values.
    ///
    /// # Errors
    ///
    /// Returns [`SpectrumError::LengthMismatch`] if the vectors differ in length.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mscosine::data::spectrum::Spectrum;
    /// let spectrum = Spectrum::new(vec![200.0, 100.0], vec![20.0, 10.0]).unwrap();
    /// assert_eq!(spectrum.mz(), &[100.0, 200.0]);
    /// assert_eq!(spectrum.intensity(), &[10.0, 20.0]);
    /// ```
    pub fn new(mz: Vec<f32>, intensity: Vec<f32>) -> Result<Self, SpectrumError> {
        if mz.len() != intensity.len() {
            return Err(SpectrumError::LengthMismatch {
                mz: mz.len(),
                intensity: intensity.len(),
            });
        }

        let peaks = mz
            .into_iter()
            .zip(intensity)
            .map(Peak::from)
            .collect::<Vec<_>>();

        Ok(Spectrum::from_peaks(peaks))
    }

    /// Builds a spectrum from peaks in any order.
    pub fn from_peaks(mut peaks: Vec<Peak>) -> Self {
        // stable, so ties on m/z keep their input order
        peaks.sort_by_key(|p| OrderedFloat(p.mz));

        let mz: Vec<f32> = peaks.iter().map(|p| p.mz).collect();
        let intensity: Vec<f32> = peaks.iter().map(|p| p.intensity).collect();

        Spectrum {
            mz: mz.into(),
            intensity: intensity.into(),
        }
    }

    /// Builds a spectrum from an ordered stream of `(mass, intensity)` pairs.
    ///
    /// This is the entry point for import adapters.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        Spectrum::from_peaks(pairs.into_iter().map(Peak::from).collect())
    }

    pub fn empty() -> Self {
        Spectrum {
            mz: Arc::from(Vec::new()),
            intensity: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn mz(&self) -> &[f32] {
        &self.mz
    }

    pub fn intensity(&self) -> &[f32] {
        &self.intensity
    }

    pub fn peaks(&self) -> impl Iterator<Item = Peak> + '_ {
        self.mz
            .iter()
            .zip(self.intensity.iter())
            .map(|(&mz, &intensity)| Peak { mz, intensity })
    }

    /// Highest intensity in the spectrum, or `0.0` when no intensity is positive.
    pub fn max_intensity(&self) -> f32 {
        let mut max = 0.0f32;
        for &value in self.intensity.iter() {
            if max < value {
                max = value;
            }
        }
        max
    }

    /// Scales all intensities so that the most intense peak becomes 1.0.
    ///
    /// Masses are untouched. A spectrum without a positive intensity yields
    /// non-finite intensities; no special casing is applied.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mscosine::data::spectrum::Spectrum;
    /// let spectrum = Spectrum::new(vec![100.0, 200.0], vec![5.0, 20.0]).unwrap();
    /// let normalized = spectrum.normalize();
    /// assert_eq!(normalized.intensity(), &[0.25, 1.0]);
    /// assert_eq!(normalized.mz(), spectrum.mz());
    /// ```
    pub fn normalize(&self) -> Spectrum {
        let max = self.max_intensity();
        let intensity: Vec<f32> = self.intensity.iter().map(|i| i / max).collect();

        // clone mz Arc, masses and their order are unchanged
        Spectrum {
            mz: self.mz.clone(),
            intensity: intensity.into(),
        }
    }

    /// Encodes the spectrum into its canonical binary layout.
    ///
    /// # Errors
    ///
    /// Fails only if the encoded size does not fit the 32 bit length header.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SpectrumError> {
        let total = HEADER_SIZE + 2 * self.len() * std::mem::size_of::<f32>();
        let header = u32::try_from(total)
            .map_err(|_| SpectrumError::malformed_binary("spectrum too large to encode"))?;

        let mut data = Vec::with_capacity(total);
        data.extend_from_slice(&header.to_le_bytes());
        data.extend(self.payload_bytes());

        Ok(data)
    }

    /// Decodes a spectrum from its canonical binary layout.
    ///
    /// The header must match the buffer length and the masses must already be
    /// sorted; nothing is re-ordered here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpectrumError> {
        if bytes.len() < HEADER_SIZE {
            return Err(SpectrumError::malformed_binary("buffer shorter than header"));
        }

        let mut rdr = Cursor::new(bytes);
        let declared = rdr
            .read_u32::<LittleEndian>()
            .map_err(|e| SpectrumError::malformed_binary(e.to_string()))? as usize;

        if declared != bytes.len() {
            return Err(SpectrumError::malformed_binary(format!(
                "header declares {} bytes, buffer holds {}",
                declared,
                bytes.len()
            )));
        }

        let payload = bytes.len() - HEADER_SIZE;
        let peak_size = 2 * std::mem::size_of::<f32>();
        if payload % peak_size != 0 {
            return Err(SpectrumError::malformed_binary(format!(
                "payload of {} bytes is not a whole number of peaks",
                payload
            )));
        }

        let count = payload / peak_size;
        let mut mz = vec![0.0f32; count];
        let mut intensity = vec![0.0f32; count];

        rdr.read_f32_into::<LittleEndian>(&mut mz)
            .map_err(|e| SpectrumError::malformed_binary(e.to_string()))?;
        rdr.read_f32_into::<LittleEndian>(&mut intensity)
            .map_err(|e| SpectrumError::malformed_binary(e.to_string()))?;

        if !mz.iter().tuple_windows().all(|(a, b)| OrderedFloat(*a) <= OrderedFloat(*b)) {
            return Err(SpectrumError::malformed_binary("masses are not sorted"));
        }

        Ok(Spectrum {
            mz: mz.into(),
            intensity: intensity.into(),
        })
    }

    /// Three-way comparison of the binary payloads.
    ///
    /// Payloads are compared byte by byte; when one is a prefix of the other the
    /// shorter one sorts first.
    pub fn compare(&self, other: &Spectrum) -> Ordering {
        self.payload_bytes().cmp(other.payload_bytes())
    }

    fn payload_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.mz
            .iter()
            .chain(self.intensity.iter())
            .flat_map(|v| v.to_le_bytes())
    }
}

impl Default for Spectrum {
    fn default() -> Self {
        Spectrum::empty()
    }
}

impl PartialEq for Spectrum {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.compare(other) == Ordering::Equal
    }
}

impl Eq for Spectrum {}

impl PartialOrd for Spectrum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Spectrum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Spectrum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.payload_bytes() {
            state.write_u8(byte);
        }
    }
}

impl From<Vec<Peak>> for Spectrum {
    fn from(peaks: Vec<Peak>) -> Self {
        Spectrum::from_peaks(peaks)
    }
}

impl From<Spectrum> for Vec<Peak> {
    fn from(spectrum: Spectrum) -> Self {
        spectrum.peaks().collect()
    }
}

impl FromIterator<Peak> for Spectrum {
    fn from_iter<T: IntoIterator<Item = Peak>>(iter: T) -> Self {
        Spectrum::from_peaks(iter.into_iter().collect())
    }
}

impl FromStr for Spectrum {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_spectrum(s)
    }
}

/// Formats the spectrum as its colon literal, `mz:intensity` pairs separated by spaces.
///
/// Each value is written with the fewest digits that parse back to the same `f32`,
/// in exponent form when its magnitude is below `1e-4` or at least `1e16`.
impl Display for Spectrum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = self
            .peaks()
            .map(|p| format!("{}:{}", shortest(p.mz), shortest(p.intensity)))
            .join(" ");
        f.write_str(&text)
    }
}

fn shortest(value: f32) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}
