//! Compatibility layer for `no_std` compilations.

use cfg_if::cfg_if;

pub use ::hashbrown::hash_map::DefaultHashBuilder;

cfg_if! {
    if #[cfg(feature = "std")] {
        pub use ::std::{
            vec,
            vec::Vec,
            string::{String, ToString},
            boxed::Box,
        };
    } else {
        pub use ::alloc::{
            vec,
            vec::Vec,
            string::{String, ToString},
            boxed::Box,
        };
    }
}
