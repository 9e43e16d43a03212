pub mod app_state;
pub mod playback_clock;
