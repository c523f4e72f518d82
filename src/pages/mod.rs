pub mod annual_reviews;
pub mod consultations;
pub mod home;
pub mod login;
pub mod phase_transfer;
