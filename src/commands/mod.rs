pub mod diff;
pub mod vars;
pub mod view;

pub use diff::DiffCommand;
pub use vars::VarsCommand;
pub use view::{ViewArgs, ViewCommand, ViewFormat};
