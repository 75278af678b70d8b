//! Classify curl errors into fetch error kinds.

use std::io;

use crate::error::FetchErrorKind;

/// Classify a curl error for reporting.
pub fn classify_curl_error(e: &curl::Error) -> FetchErrorKind {
    if e.is_operation_timedout() {
        return FetchErrorKind::Timeout;
    }
    if e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_ssl_certproblem()
        || e.is_ssl_cacert()
        || e.is_ssl_cipher()
    {
        return FetchErrorKind::Tls;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FetchErrorKind::Connection;
    }
    FetchErrorKind::Other
}

/// Convert a curl error raised after the body started into an I/O error for the reader.
pub fn curl_error_to_io(e: curl::Error) -> io::Error {
    let kind = match classify_curl_error(&e) {
        FetchErrorKind::Timeout => io::ErrorKind::TimedOut,
        FetchErrorKind::Connection => io::ErrorKind::ConnectionAborted,
        FetchErrorKind::Tls | FetchErrorKind::Other => io::ErrorKind::Other,
    };
    io::Error::new(kind, e)
}
