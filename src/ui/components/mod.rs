pub mod chapter_list;
pub mod flip_card;
pub mod import_panel;
pub mod menu;
pub mod progress_bar;
pub mod quiz_summary;
