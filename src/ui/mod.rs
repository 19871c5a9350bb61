pub mod app_shell;

pub use app_shell::launch_window;
