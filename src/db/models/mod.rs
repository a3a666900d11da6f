pub mod location;
pub mod personnel;
pub mod shift;
pub mod task;
pub mod template;
