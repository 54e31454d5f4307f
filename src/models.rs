pub mod auth;
pub mod company;
pub mod lead;
pub mod notification;
pub mod proposal;
pub mod stages;
pub mod user;
