//! Logging macros.
//!
//! - `defmt` feature: forwarded to `defmt`
//! - Host unit tests: printed with `println!`
//! - Host, non-test: no-op
//!
//! Format strings must stay within what both `defmt` and `core::fmt`
//! accept: `{}` for primitives, `{:?}` for crate enums.

#[macro_export]
#[doc(hidden)]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[ERROR] {}", format!($($arg)*));
    }};
}
