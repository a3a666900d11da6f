pub mod health;
pub mod personnel;
pub mod shift;
pub mod task;
pub mod template;
