pub mod dialog;
pub mod output;

pub use dialog::DialogRenderer;
