// Module exports for models

pub mod principal;
pub mod project;
pub mod settings;
pub mod task;
pub mod task_log;
pub mod worker;
