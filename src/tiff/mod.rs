//! TIFF file format parsing module
//!
//! This module provides structures and functions for reading
//! TIFF and BigTIFF format files.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
mod tests;
pub mod geotags;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub mod geo_key_parser;
pub(crate) mod validation;
pub(crate) mod colormap;

pub mod field_type;
pub mod mode;
pub mod entry;
pub mod cursor;
pub mod ifd_writer;
pub mod ifd_reader;
pub mod legacy_bridge;
pub mod region;
#[cfg(test)]
mod scenarios;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geotags::{GeoKeyEntry, get_key_name, get_projected_cs_description, get_tag_name, is_geotiff_tag};
pub use builder::TiffBuilder;
pub use field_type::FieldType;
pub use mode::FileMode;
pub use cursor::WriterCursor;
pub use ifd_writer::IfdWriter;
pub use ifd_reader::{read_chain, read_directory, Directory, IfdReaderOptions, OrderPolicy};
pub use legacy_bridge::{directory_to_ifd, ifd_to_raw_entries};
pub use region::Region;

// Constants for TIFF format
pub const BIGTIFF_VERSION: u16 = 43;
pub const BIGTIFF_OFFSETSIZE: u16 = 8;