pub mod chrome;
pub mod content;
pub mod header;
pub mod menu;
pub mod status_bar;
