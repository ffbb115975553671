//! Client for the Eufy Security cloud.
//!
//! [`Api`] handles login, the device/station registries, parameter upload,
//! and the stream relay endpoints. [`Station`] bridges from a cloud record
//! to a live [`eufy_p2p::Session`] using the DSK key the cloud hands out.

pub mod api;
pub mod device;
pub mod error;
pub mod params;
pub mod station;

pub use api::{Api, API_BASE};
pub use device::{Device, DeviceInfo, DeviceType};
pub use error::CloudError;
pub use params::{Param, ParamError, ParamRow, ParamType, Params};
pub use station::{GuardMode, Member, Station, StationInfo};
