use {super::*, client::ClientError, ledger::LedgerError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum SpamError {
    #[snafu(display("operation aborted"))]
    Aborted,

    #[snafu(display("no {kind} outputs available"))]
    NoUtxoAvailable { kind: &'static str },

    #[snafu(display("no {kind} outputs left after filtering"))]
    FilteredEmpty { kind: &'static str },

    #[snafu(display("no free output slot for the {kind} output"))]
    MaxOutputsExceeded { kind: &'static str },

    #[snafu(display("insufficient funds: {available} available, {required} required"))]
    InsufficientFunds { available: u64, required: u64 },

    #[snafu(display("native tokens of the inputs are not carried over by the outputs"))]
    UnbalancedNativeTokens,

    #[snafu(display("invalid transaction payload: {source}"))]
    InvalidPayload { source: LedgerError },

    #[snafu(display("{source}"))]
    Pow { source: PowError },

    #[snafu(display("ledger client error: {source}"))]
    Client { source: ClientError },

    #[snafu(display("created output {output_id} belongs to {address}, not to the receiving account"))]
    BookingFailed { output_id: OutputId, address: Address },
}

impl SpamError {
    /// Errors after which account bookkeeping can no longer be trusted.
    pub(crate) fn is_fatal(&self) -> bool {
        matches!(self, Self::BookingFailed { .. })
    }

    pub(crate) fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

impl From<PowError> for SpamError {
    fn from(err: PowError) -> Self {
        match err {
            PowError::Aborted => Self::Aborted,
            source => Self::Pow { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_booking_failures_are_fatal() {
        let booking = SpamError::BookingFailed {
            output_id: OutputId::new(TransactionId::random(), 0),
            address: Address::random(),
        };
        assert!(booking.is_fatal());

        for err in [
            SpamError::Aborted,
            SpamError::NoUtxoAvailable { kind: "basic" },
            SpamError::FilteredEmpty { kind: "basic" },
            SpamError::MaxOutputsExceeded { kind: "basic" },
            SpamError::UnbalancedNativeTokens,
            SpamError::Client {
                source: ClientError::NoTips,
            },
        ] {
            assert!(!err.is_fatal(), "{err} should not be fatal");
        }
    }

    #[test]
    fn aborted_pow_is_aborted_spam() {
        assert!(SpamError::from(PowError::Aborted).is_aborted());

        let err = SpamError::from(PowError::RefreshTips {
            source: ClientError::NoTips,
        });
        assert!(matches!(err, SpamError::Pow { .. }));
        assert!(!err.is_aborted());
    }
}
