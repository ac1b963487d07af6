use thiserror::Error;

/// Domain failures that abort a report request.
///
/// I/O and CSV-level failures travel through `anyhow` with path context;
/// the variants here are the ones callers and tests match on.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A trail `tis` value that chrono cannot represent as an instant.
    #[error("trail timestamp {seconds}s is outside the representable range")]
    TrailTimestamp { seconds: i64 },

    /// A trip `date_time` cell that is not a valid `YYYYMMDDHHMMSS` string.
    #[error("malformed trip date_time {value:?}, expected YYYYMMDDHHMMSS")]
    TripDateTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A window bound that chrono cannot represent as an instant.
    #[error("window bound {seconds}s is outside the representable range")]
    WindowBound { seconds: i64 },

    /// A vehicle whose representative license plate has no trip-metadata
    /// match. Raised only under [`MissingTripPolicy::Fail`].
    ///
    /// [`MissingTripPolicy::Fail`]: crate::metrics::MissingTripPolicy::Fail
    #[error("no trip metadata matches license plate {plate:?}")]
    NoMatchingTrip { plate: String },
}
