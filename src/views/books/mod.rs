pub mod book_list;
pub mod details;
pub mod export;
pub mod register;
