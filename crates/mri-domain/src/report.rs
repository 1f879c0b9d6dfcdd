//! Reporte de texto con layout fijo.
//!
//! Orden de secciones: encabezado, archivo de entrada, estadísticas básicas,
//! segmentación de tejidos, segmentación subcortical y nota final. Los
//! valores se copian literales desde los registros parseados.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::stats::{FullStatistics, VolumeStatistics};
use crate::DomainError;

pub const VOLUME_UNIT: &str = "mm³";
pub const REPORT_TITLE: &str = "Advanced MRI Analysis Report";
const RULE: &str = "------------------------------";
const VOXEL_NOTE: &str =
    "Note: Volumes are based on voxel counts multiplied by voxel dimensions as stored in image headers.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MriReport {
    pub input_file: String,
    pub whole_brain: FullStatistics,
    pub csf: VolumeStatistics,
    pub gray_matter: VolumeStatistics,
    pub white_matter: VolumeStatistics,
    pub left_hippocampus: VolumeStatistics,
    pub right_hippocampus: VolumeStatistics,
}

/// Reúne todos los registros en un `MriReport`.
pub fn assemble(input_file: &str,
                whole_brain: &FullStatistics,
                csf: &VolumeStatistics,
                gray_matter: &VolumeStatistics,
                white_matter: &VolumeStatistics,
                left_hippocampus: &VolumeStatistics,
                right_hippocampus: &VolumeStatistics)
                -> MriReport {
    MriReport { input_file: input_file.to_string(),
                whole_brain: whole_brain.clone(),
                csf: csf.clone(),
                gray_matter: gray_matter.clone(),
                white_matter: white_matter.clone(),
                left_hippocampus: left_hippocampus.clone(),
                right_hippocampus: right_hippocampus.clone() }
}

fn volume_line(out: &mut String, label: &str, volume: &dyn std::fmt::Display, voxels: &dyn std::fmt::Display) {
    let _ = writeln!(out, "  - {label} Volume: {volume} {VOLUME_UNIT} (from {voxels} voxels)");
}

impl MriReport {
    pub fn render(&self) -> String {
        let wb = &self.whole_brain;
        let mut out = String::new();
        out.push('\n');
        let _ = writeln!(out, "{REPORT_TITLE}");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Input File: {}", self.input_file);
        out.push('\n');

        let _ = writeln!(out, "Basic Statistics (Brain-Extracted Image):");
        let _ = writeln!(out, "  - Minimum Intensity: {}", wb.min);
        let _ = writeln!(out, "  - Maximum Intensity: {}", wb.max);
        let _ = writeln!(out, "  - Mean Intensity: {}", wb.mean);
        volume_line(&mut out, "Brain", &wb.volume, &wb.voxels);
        let _ = writeln!(out, "  - Median Intensity: {}", wb.median);
        let _ = writeln!(out, "  - Standard Deviation: {}", wb.std_dev);
        out.push('\n');

        let _ = writeln!(out, "Tissue Segmentation (FAST):");
        for (label, s) in [("CSF", &self.csf), ("Gray Matter", &self.gray_matter), ("White Matter", &self.white_matter)] {
            volume_line(&mut out, label, &s.volume, &s.voxels);
        }
        out.push('\n');

        let _ = writeln!(out, "Subcortical Segmentation (FIRST):");
        for (label, s) in [("Left Hippocampus", &self.left_hippocampus), ("Right Hippocampus", &self.right_hippocampus)] {
            volume_line(&mut out, label, &s.volume, &s.voxels);
        }
        out.push('\n');

        let _ = writeln!(out, "{VOXEL_NOTE}");
        out
    }

    /// Escribe el reporte en `path` (archivo temporal hermano + rename).
    pub fn persist(&self, path: &Path) -> Result<(), DomainError> {
        let tmp = temp_sibling(path);
        let io_err = |p: &Path| {
            let p = p.display().to_string();
            move |source: std::io::Error| DomainError::Io { path: p, source }
        };
        let written = fs::write(&tmp, self.render()).map_err(io_err(&tmp))
                                                   .and_then(|()| fs::rename(&tmp, path).map_err(io_err(path)));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        debug!("report written to {}", path.display());
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "report".into());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_full, parse_volume};

    fn sample() -> MriReport {
        let wb = parse_full("0 4095 312.5 120000 96000 300 55.2").unwrap();
        let tissue = parse_volume("10000 8000.0").unwrap();
        let hippo = parse_volume("500 400.0").unwrap();
        assemble("scan.nii.gz", &wb, &tissue, &tissue, &tissue, &hippo, &VolumeStatistics::zero())
    }

    #[test]
    fn render_contains_literal_lines() {
        let text = sample().render();
        assert!(text.contains("Input File: scan.nii.gz\n"));
        assert!(text.contains("Brain Volume: 96000 mm³ (from 120000 voxels)"));
        assert!(text.contains("Left Hippocampus Volume: 400.0 mm³ (from 500 voxels)"));
        assert!(text.contains("Right Hippocampus Volume: 0 mm³ (from 0 voxels)"));
        assert!(text.starts_with("\nAdvanced MRI Analysis Report\n"));
        assert!(text.ends_with("image headers.\n"));
    }

    #[test]
    fn render_has_six_volume_sections_in_order() {
        let text = sample().render();
        let volumes: Vec<&str> = text.lines().filter(|l| l.contains(" Volume: ")).collect();
        assert_eq!(volumes.len(), 6);
        let order = ["Brain", "CSF", "Gray Matter", "White Matter", "Left Hippocampus", "Right Hippocampus"];
        for (line, label) in volumes.iter().zip(order) {
            assert!(line.starts_with(&format!("  - {label} Volume: ")), "{line}");
        }
        assert_eq!(text.lines().filter(|l| *l == REPORT_TITLE).count(), 1);
        assert_eq!(text.lines().filter(|l| l.starts_with("Input File: ")).count(), 1);
    }
}
