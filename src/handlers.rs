pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod data;
pub mod deals;
pub mod finance;
pub mod settings;
pub mod tasks;
