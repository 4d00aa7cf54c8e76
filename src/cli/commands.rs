mod forecast;
mod serve;

pub use forecast::forecast;
pub use serve::serve;
