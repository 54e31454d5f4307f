pub mod company_repo;
pub use company_repo::{CompanyRepository, CompanyStore};
pub mod lead_repo;
pub use lead_repo::{LeadRepository, LeadStore};
pub mod notification_repo;
pub use notification_repo::{NotificationRepository, NotificationStore};
pub mod proposal_repo;
pub use proposal_repo::{ProposalRepository, ProposalStore};
pub mod stage_repo;
pub use stage_repo::{StageRepository, StageStore};
pub mod user_repo;
pub use user_repo::{UserRepository, UserStore};
