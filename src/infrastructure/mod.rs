pub mod js_executor;
pub mod page_reader;

pub use js_executor::JsExecutor;
pub use page_reader::PageReader;
