pub mod app;
pub mod balance_display;
pub mod globe_view;
pub mod leaderboard;
pub mod loading_screen;
pub mod marketplace;
pub mod mission_center;
pub mod mission_row;
pub mod modal_frame;
pub mod nav_bar;
pub mod onboarding_modal;
pub mod profile;
