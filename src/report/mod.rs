pub mod input;
pub mod output;

pub use input::read_queries;
pub use output::{render_summary, write_csv};
