//===========================================================================//

macro_rules! format_error {
    ($e:expr) => {
        return Err($crate::Error::Format($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::Error::Format(format!($fmt, $($arg)+)))
    };
}

macro_rules! validation_error {
    ($e:expr) => {
        return Err($crate::Error::Validation($e.to_string()))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::Error::Validation(format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
