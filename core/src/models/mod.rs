pub mod execution;
pub mod fees;
pub mod order_book;
