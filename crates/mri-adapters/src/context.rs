//! Contexto explícito de una corrida.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TOOLKIT_ROOT: &str = "/usr/local/fsl";
/// Template de registro, relativo a la raíz del toolkit.
pub const MNI_TEMPLATE: &str = "data/standard/MNI152_T1_1mm_brain.nii.gz";

/// Nombres fijos de los archivos intermedios y del reporte.
///
/// Son deterministas por corrida: dos corridas en el mismo directorio se
/// pisan entre sí.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactNames {
    pub brain_extracted: String,
    pub fast_prefix: String,
    pub mni_volume: String,
    pub mni_matrix: String,
    pub first_prefix: String,
    pub left_hippocampus: String,
    pub right_hippocampus: String,
    pub report: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self { brain_extracted: "brain_extracted.nii.gz".into(),
               fast_prefix: "fast_output".into(),
               mni_volume: "brain_mni.nii.gz".into(),
               mni_matrix: "brain2mni.mat".into(),
               first_prefix: "first_output".into(),
               left_hippocampus: "left_hippocampus.nii.gz".into(),
               right_hippocampus: "right_hippocampus.nii.gz".into(),
               report: "advanced_mri_report.txt".into() }
    }
}

impl ArtifactNames {
    /// Mapa de volumen parcial que produce `fast` para la clase.
    pub fn tissue_map(&self, class: TissueClass) -> String {
        format!("{}_pve_{}.nii.gz", self.fast_prefix, class.pve_index())
    }

    pub fn first_segmentation(&self) -> String {
        format!("{}_all_fast_firstseg.nii.gz", self.first_prefix)
    }

    pub fn hippocampus_mask(&self, side: Hemisphere) -> &str {
        match side {
            Hemisphere::Left => &self.left_hippocampus,
            Hemisphere::Right => &self.right_hippocampus,
        }
    }
}

/// Clases de tejido de `fast -n 3`, en orden de índice pve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TissueClass {
    Csf,
    GrayMatter,
    WhiteMatter,
}

impl TissueClass {
    pub const ALL: [TissueClass; 3] = [TissueClass::Csf, TissueClass::GrayMatter, TissueClass::WhiteMatter];

    pub fn pve_index(self) -> usize {
        match self {
            TissueClass::Csf => 0,
            TissueClass::GrayMatter => 1,
            TissueClass::WhiteMatter => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    pub fn structure(self) -> &'static str {
        match self {
            Hemisphere::Left => "left_hippocampus",
            Hemisphere::Right => "right_hippocampus",
        }
    }
}

/// Etiquetas de la segmentación subcortical para cada hipocampo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureLabels {
    pub left: u32,
    pub right: u32,
}

impl Default for StructureLabels {
    fn default() -> Self {
        Self { left: 17, right: 53 }
    }
}

impl StructureLabels {
    pub fn label(&self, side: Hemisphere) -> u32 {
        match side {
            Hemisphere::Left => self.left,
            Hemisphere::Right => self.right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub working_dir: PathBuf,
    pub toolkit_root: PathBuf,
    pub names: ArtifactNames,
    pub labels: StructureLabels,
    pub timeout: Option<Duration>,
}

impl RunContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self { working_dir: working_dir.into(),
               toolkit_root: PathBuf::from(DEFAULT_TOOLKIT_ROOT),
               names: ArtifactNames::default(),
               labels: StructureLabels::default(),
               timeout: None }
    }

    pub fn with_toolkit_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.toolkit_root = root.into();
        self
    }

    pub fn with_names(mut self, names: ArtifactNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_labels(mut self, labels: StructureLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn template_path(&self) -> String {
        self.toolkit_root.join(MNI_TEMPLATE).display().to_string()
    }

    /// Ruta de un artifact relativo al directorio de trabajo.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }

    pub fn report_path(&self) -> PathBuf {
        self.resolve(&self.names.report)
    }
}
