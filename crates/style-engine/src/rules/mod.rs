//! One module per rule family. Each exposes a `check_*` function that takes
//! the region text and returns its spans in left-to-right order.

pub mod filler;
pub mod first_person;
pub mod forbidden;
pub mod passive;
pub mod pronoun;
