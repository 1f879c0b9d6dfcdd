//! mri-adapters: pipeline de análisis MRI sobre `mri-core`.
//!
//! Este crate provee:
//! - `RunContext`: directorio de trabajo, raíz del toolkit, nombres de
//!   artifacts, etiquetas de estructuras y timeout. Reemplaza todo estado
//!   ambiental; los steps no leen variables de entorno.
//! - Artifacts tipados (`artifacts`) y los roles con que viajan en la
//!   `ArtifactTable`.
//! - Un step por transición del pipeline (`steps`).
//! - `MriPipeline` y `PipelineState`, derivado del replay de eventos.

pub mod artifacts;
pub mod context;
pub mod pipeline;
pub mod steps;

pub use context::{ArtifactNames, Hemisphere, RunContext, StructureLabels, TissueClass, DEFAULT_TOOLKIT_ROOT,
                  MNI_TEMPLATE};
pub use pipeline::{MriPipeline, PipelineOutcome, PipelineState};
