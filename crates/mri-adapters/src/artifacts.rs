//! Artifacts tipados del pipeline y roles bajo los que se publican.
//!
//! Los volúmenes sólo llevan la ruta: el archivo lo crea (y es dueña) la
//! herramienta externa. Las estadísticas conservan los tokens literales.

use mri_core::{typed_artifact, ArtifactKind};
use mri_domain::{FullStatistics, MriReport, VolumeStatistics};

typed_artifact!(VolumeArtifact { path: String } kind: ArtifactKind::FilePath);

typed_artifact!(FullStatsArtifact { stats: FullStatistics } kind: ArtifactKind::Statistics);

// `tolerated`: la salida no tenía 2 campos y se reemplazó por ceros.
typed_artifact!(VolumeStatsArtifact {
    stats: VolumeStatistics,
    tolerated: bool,
} kind: ArtifactKind::Statistics);

typed_artifact!(ReportArtifact {
    path: String,
    report: MriReport,
} kind: ArtifactKind::Report);

impl VolumeArtifact {
    pub fn at(path: impl Into<String>) -> Self {
        Self { path: path.into(), schema_version: 1 }
    }
}

pub mod roles {
    use crate::context::{Hemisphere, TissueClass};

    pub const INPUT_VOLUME: &str = "input_volume";
    pub const NORMALIZED_VOLUME: &str = "normalized_volume";
    pub const BRAIN_VOLUME: &str = "brain_volume";
    pub const WHOLE_BRAIN_STATS: &str = "whole_brain_stats";
    pub const MNI_VOLUME: &str = "mni_volume";
    pub const MNI_MATRIX: &str = "mni_matrix";
    pub const FIRST_SEGMENTATION: &str = "first_segmentation";
    pub const REPORT: &str = "report";

    pub fn tissue_map(class: TissueClass) -> &'static str {
        match class {
            TissueClass::Csf => "csf_map",
            TissueClass::GrayMatter => "gray_matter_map",
            TissueClass::WhiteMatter => "white_matter_map",
        }
    }

    pub fn tissue_stats(class: TissueClass) -> &'static str {
        match class {
            TissueClass::Csf => "csf_stats",
            TissueClass::GrayMatter => "gray_matter_stats",
            TissueClass::WhiteMatter => "white_matter_stats",
        }
    }

    pub fn hippocampus_mask(side: Hemisphere) -> &'static str {
        match side {
            Hemisphere::Left => "left_hippocampus_mask",
            Hemisphere::Right => "right_hippocampus_mask",
        }
    }

    pub fn hippocampus_stats(side: Hemisphere) -> &'static str {
        match side {
            Hemisphere::Left => "left_hippocampus_stats",
            Hemisphere::Right => "right_hippocampus_stats",
        }
    }
}
