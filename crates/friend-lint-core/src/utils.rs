//! Utility functions for model building.

pub mod attributes;
pub mod paths;

#[doc(inline)]
pub use attributes::{friend_attrs, parse_friend_args, FriendArg};
#[doc(inline)]
pub use paths::{path_segments, path_to_string, type_path_segments};
