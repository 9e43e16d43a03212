pub mod external_mpv;
pub mod mpv_ipc;

pub use external_mpv::{MpvProcess, MpvSurface};
