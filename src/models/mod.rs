// Module exports for models

pub mod course;
pub mod gantt_config;
pub mod record;
pub mod resource_row;
pub mod settings;
pub mod snapshot;
pub mod time_slot;
