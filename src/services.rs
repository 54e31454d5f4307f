pub mod access;
pub mod auth;
pub mod company_service;
pub mod lead_normalizer;
pub mod lead_service;
pub mod messaging;
pub mod meta_ads;
pub mod notification_service;
pub mod proposal_service;
pub mod stage_service;
pub mod user_service;
