//! Assets domain module.
//!
//! Hosts, switches, firewalls and VMs. Physical hardware sits at a site; VMs run in an
//! infrastructure location referenced from their specs.

pub mod asset;

pub use asset::{
    Asset, AssetSpecs, AssetType, AssetUpdate, HostSpecs, NetworkDeviceSpecs, NewAsset, VmSpecs,
};
