//! Reading and writing EAARL lidar data: EDB index files, TLD raw data
//! files, and flights that join the two for random access to rasters.
pub mod config;
pub mod edb;
pub mod env;
pub mod flight;
pub mod raster;
pub mod tld;
pub mod units;
pub mod util;

pub use config::{EdbReadConfig, ReadConfig};
pub use edb::{EdbIndex, EdbRecord};
pub use flight::Flight;
pub use raster::{Pulse, Raster};
pub use util::{default_memory, Code, Error, MemoryRef, Result};
