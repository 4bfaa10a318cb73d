pub trait ResultOkLogExt<T, E> {
    /// Converts the result to an `Option`, logging the error under `what`
    /// when it is discarded.
    fn ok_or_log(self, what: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_or_log(self, what: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{what}: {err}");
                None
            }
        }
    }
}
