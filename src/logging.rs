// Leveled diagnostics.
//
// Firmware builds (feature `esp32s3`) print through esp-println as
// `[LEVEL] message`. Host builds keep the format arguments type-checked but
// emit nothing.

#[cfg(feature = "esp-println")]
macro_rules! log_at {
    ($level:literal, $($arg:tt)*) => {
        esp_println::println!("[{}] {}", $level, format_args!($($arg)*))
    };
}

#[cfg(not(feature = "esp-println"))]
macro_rules! log_at {
    ($level:literal, $($arg:tt)*) => {{
        let _ = ($level, format_args!($($arg)*));
    }};
}

macro_rules! log_error {
    ($($arg:tt)*) => { log_at!("ERROR", $($arg)*) };
}

macro_rules! log_warn {
    ($($arg:tt)*) => { log_at!("WARN", $($arg)*) };
}

macro_rules! log_info {
    ($($arg:tt)*) => { log_at!("INFO", $($arg)*) };
}

macro_rules! log_debug {
    ($($arg:tt)*) => { log_at!("DEBUG", $($arg)*) };
}
