pub mod bundle;
pub mod github;
pub mod package;
pub mod score;
