pub mod core;
pub mod course;
pub mod exchange;
pub mod history;
pub mod lessons;
pub mod modules;
