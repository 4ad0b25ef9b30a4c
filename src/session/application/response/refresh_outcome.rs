/// What a refresh tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was loaded (or the load failed and was reported).
    Refreshed,
    /// A load for the current selection was already in flight.
    Skipped,
    /// Nothing is selected, or the current status is not refreshable.
    NotApplicable,
}
