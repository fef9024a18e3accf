pub mod conversation;
pub mod enums;
pub mod feedback;

pub use conversation::*;
pub use enums::*;
pub use feedback::*;
