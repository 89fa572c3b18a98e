pub mod icons;
pub mod output;
pub mod progress;
pub mod render;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, muted, prompt, section, status, success, summary_row, warn};
pub use progress::Spinner;
pub use render::print_update;
pub use table::TableBuilder;
pub use theme::{theme, Theme};
