//! Customers domain module (customers and their sites).
//!
//! This crate contains the document shapes and the pure validation/naming rules for
//! customers and sites (no IO, no HTTP, no storage). Cross-document rules (the main
//! site, last-site protection) are enforced by the lifecycle orchestrator in
//! `assetdesk-infra`.

pub mod customer;
pub mod site;

pub use customer::{Address, Customer, CustomerUpdate};
pub use site::{MAIN_SITE_NAME, NewSite, Site, SitePatch, SiteUpdate, combined_site_name};
