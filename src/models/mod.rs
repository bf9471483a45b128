pub mod credit;
pub mod dashboard;
pub mod demo;
pub mod document;
pub mod gauge;
pub mod period;
pub mod profile;
pub mod session;
pub mod settings;
