mod taiga;

pub use taiga::TaigaProjectProvider;
