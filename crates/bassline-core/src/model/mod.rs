pub mod enrichment;
pub mod platform;
pub mod record;
pub mod track;
pub mod verification;

pub use enrichment::{EnrichmentResult, PlatformSlot, SlotStatus};
pub use platform::Platform;
pub use record::TrackRecord;
pub use track::NormalizedTrack;
pub use verification::VerificationResult;
