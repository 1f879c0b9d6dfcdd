//! Macro para declarar artifacts tipados sin boilerplate.
//!
//! Exportada en la raíz del crate: `use mri_core::typed_artifact;`

/// Declara un Artifact tipado con derives y `ArtifactSpec`.
///
/// Forma: `typed_artifact!(Name { field: Ty, .. } kind: ArtifactKind::FilePath);`
///
/// El crate que invoca la macro debe depender de `serde`.
#[macro_export]
macro_rules! typed_artifact {
    ($name:ident { $($fname:ident : $fty:ty),+ $(,)? } kind: $kind:expr) => {
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        pub struct $name { $(pub $fname: $fty,)+ pub schema_version: u32 }
        impl $crate::model::ArtifactSpec for $name {
            const KIND: $crate::model::ArtifactKind = $kind;
        }
    };
}
