pub(crate) mod handler;
pub(crate) mod scheme;
pub(crate) mod screen;

pub(crate) use handler::HandlerRegistry;
pub(crate) use scheme::SchemeTable;
pub(crate) use screen::ScreenRegistry;
