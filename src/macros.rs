macro_rules! format_error {
    ($e:expr) => {
        return Err($crate::error::RebuildError::Format(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::RebuildError::Format(format!($fmt, $($arg)+)))
    };
}

macro_rules! decode_error {
    ($e:expr) => {
        return Err($crate::error::RebuildError::Decode(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::RebuildError::Decode(format!($fmt, $($arg)+)))
    };
}

macro_rules! encode_error {
    ($e:expr) => {
        return Err($crate::error::RebuildError::Encode(($e).to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::RebuildError::Encode(format!($fmt, $($arg)+)))
    };
}

macro_rules! config_error {
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::RebuildError::Config(format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
