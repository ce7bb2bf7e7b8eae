//! Logging-Shim für die Core-Crate
//!
//! Mit Feature `defmt` werden die Makros an defmt weitergereicht,
//! ohne Feature werden sie wegkompiliert (Argumente werden trotzdem
//! ausgewertet, damit keine `unused`-Warnungen entstehen).
//!
//! Wird per `#[macro_use]` als erstes Modul eingebunden, die Makros
//! sind danach in der ganzen Crate ohne Import sichtbar.
#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = (discard_args!($($arg)*));
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = (discard_args!($($arg)*));
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = (discard_args!($($arg)*));
    }};
}

macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        let _ = (discard_args!($($arg)*));
    }};
}

// Verwirft Format-String und Argumente
macro_rules! discard_args {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        ($(&$arg,)*)
    };
}
