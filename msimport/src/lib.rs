// data module
pub mod data {
    pub mod lines;
    pub mod mgf;
    pub mod sdf;
}

pub mod config;
pub mod errors;

pub use crate::data::mgf::{read_mgf, MgfReader, MgfRecord};
pub use crate::data::sdf::{read_sdf, SdfReader, SdfRecord};
pub use crate::errors::ImportError;
