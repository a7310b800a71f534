//! Infrastructure locations domain module.
//!
//! Where a customer's workloads run: a cloud account (Azure, AWS), a datacenter, or
//! on-premise at one of the customer's sites. Pure document shapes and validation.

pub mod location;

pub use location::{
    AwsConfig, AzureConfig, DatacenterConfig, InfrastructureLocation, InfrastructureUpdate,
    LocationConfig, LocationType, NewInfrastructure, OnPremiseConfig,
};
