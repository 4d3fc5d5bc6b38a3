//! Controllers linked into the `dispatch-core` binary. They register
//! themselves; nothing refers to them by name.

mod greeting;
mod login;
