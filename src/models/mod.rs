pub mod artifact;
pub mod loaders;

pub use artifact::{CorrectedArtifacts, QaArtifacts};
pub use loaders::{load_artifacts, save_artifacts, save_report};
