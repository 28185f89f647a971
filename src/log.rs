#![allow(unused, reason = "logger")]

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::debug!(target: "httpr", $($tt)*);
    };
}

macro_rules! warning {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::warn!(target: "httpr", $($tt)*);
    };
}

pub(crate) use {debug, warning};
