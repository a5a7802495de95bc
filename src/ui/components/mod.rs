pub mod guide_list;
pub mod menu;
pub mod progress_bar;
pub mod progress_dashboard;
pub mod question_card;
pub mod result_dashboard;
pub mod test_sidebar;
