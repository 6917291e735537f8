pub mod entries;
pub mod health;
pub mod history;
pub mod profile;
pub mod ws;
