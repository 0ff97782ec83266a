pub mod caption;
pub mod check;
pub mod compose;
pub mod shoot;
