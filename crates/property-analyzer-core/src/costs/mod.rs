pub mod purchase;
pub mod rules;
pub mod running;
pub mod selling;
