mod app;
mod dialog;
mod operations;
mod widgets;

pub use app::LoaderApp;
