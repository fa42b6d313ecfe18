// Service module exports

pub mod api;
pub mod bar_layout;
pub mod ledger;
pub mod linker;
pub mod session;
pub mod settings;
pub mod time_grid;
pub mod work_time;
