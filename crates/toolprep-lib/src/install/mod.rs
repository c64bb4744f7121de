//! Turning a catalog target into an installed tool.

mod extract;
mod pipeline;

pub use extract::{ArchiveExtractor, ArchiveFormat, ArchiveUnpacker, Compression, ExtractRequest, detect_format};
pub use pipeline::{Collaborators, InstallFailure, InstallReport, InstallSettings, InstallStage, Installer};
