pub mod page;

pub use page::handle_page;
