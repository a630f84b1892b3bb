// Library for tests to access modules

pub mod alerts;
pub mod config;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod models;
pub mod refresh;
pub mod routes;
pub mod session;
pub mod state;
pub mod version;
pub mod worker;
