//! Linux implementation (X11)

mod x11_capture;

pub use x11_capture::X11WindowSystem;
