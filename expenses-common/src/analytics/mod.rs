pub mod budget;
pub mod spending;
pub mod window;

pub use window::MonthWindow;
