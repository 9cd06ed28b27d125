//! Public-view projection.

/// Explicit projection applied to a record before it leaves the pipeline.
///
/// Records that carry sensitive fields (credential hashes, internal flags)
/// implement this once; handlers return `record.public_view()` rather than the
/// record itself, so no code path can accidentally serialize a secret.
pub trait PublicView {
    type Public;

    fn public_view(&self) -> Self::Public;
}
