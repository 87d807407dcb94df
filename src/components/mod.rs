pub mod dialogs;
pub mod history;
