pub mod card;
pub mod compare;
pub mod export;
pub mod insights;
