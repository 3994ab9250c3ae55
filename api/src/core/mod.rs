pub mod advice;
pub mod app_state;
pub mod sink;
