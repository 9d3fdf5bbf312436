pub mod config;
pub mod doctor;
pub mod fetch;
pub mod run;
pub mod steps;
