pub mod admin;
pub mod auth;
pub mod leads;
pub mod notifications;
pub mod proposals;
pub mod stages;
