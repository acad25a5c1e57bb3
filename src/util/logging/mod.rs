pub mod standards;

pub use standards::events;
