pub mod delivery;
pub mod discord;
pub mod presentation;
pub mod status;
