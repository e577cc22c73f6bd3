//! Delivery counters for an adapter

/// Statistics for adapter usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterStats {
    /// Target-channel arrivals accepted while active
    pub payloads_received: u64,

    /// Payloads handed to a consumer
    pub payloads_delivered: u64,

    /// Buffered payloads dropped by an error or termination
    pub payloads_discarded: u64,

    /// Pending requests failed with an error
    pub requests_failed: u64,

    /// Arrivals that reached the adapter after it stopped being active
    pub arrivals_ignored: u64,
}

impl AdapterStats {
    /// Payloads currently accounted for neither as delivered nor discarded
    pub fn in_buffer(&self) -> u64 {
        self.payloads_received
            .saturating_sub(self.payloads_delivered)
            .saturating_sub(self.payloads_discarded)
    }

    /// Get the delivery rate (payloads delivered / payloads received)
    pub fn delivery_rate(&self) -> f64 {
        if self.payloads_received == 0 {
            1.0
        } else {
            self.payloads_delivered as f64 / self.payloads_received as f64
        }
    }
}

impl std::fmt::Display for AdapterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Adapter Stats:")?;
        writeln!(f, "  Payloads received: {}", self.payloads_received)?;
        writeln!(f, "  Payloads delivered: {}", self.payloads_delivered)?;
        writeln!(f, "  Payloads discarded: {}", self.payloads_discarded)?;
        writeln!(f, "  Requests failed: {}", self.requests_failed)?;
        writeln!(f, "  Arrivals ignored: {}", self.arrivals_ignored)?;
        writeln!(f, "  Delivery rate: {:.1}%", self.delivery_rate() * 100.0)?;
        Ok(())
    }
}
