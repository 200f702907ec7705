pub mod day;
pub mod secret;
pub mod selector;
pub mod taxonomy;
pub mod work_time;
