// Port for retrieving the current time in milliseconds.
//
// Only differences between readings matter, so adapters may use any epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}
