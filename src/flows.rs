//! Flow orchestrators: the three-legged handshake, the approval port it blocks on, and the
//! credential source that decides whether a handshake is needed at all.

pub mod approval;
pub mod handshake;
pub mod source;

pub use approval::*;
pub use handshake::*;
pub use source::*;
