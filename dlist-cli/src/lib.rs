//! Library half of the `dlist` binary, kept separate so the inspect transforms can be
//! tested without spawning a process.

pub mod inspect;
