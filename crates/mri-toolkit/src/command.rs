//! Líneas de comando de las herramientas FSL.
//!
//! Los flags son fijos; sólo varían las rutas y las etiquetas.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `fslchfiletype NIFTI_GZ <input> <output>`
    pub fn convert_to_nifti_gz(input: &str, output: &str) -> Self {
        Self::new("fslchfiletype").args(["NIFTI_GZ", input, output])
    }

    /// `bet <input> <output> -f 0.5 -g 0`
    pub fn brain_extraction(input: &str, output: &str) -> Self {
        Self::new("bet").args([input, output, "-f", "0.5", "-g", "0"])
    }

    /// `fslstats <volume> -R -M -V -P 50 -S`
    pub fn full_statistics(volume: &str) -> Self {
        Self::new("fslstats").args([volume, "-R", "-M", "-V", "-P", "50", "-S"])
    }

    /// `fslstats <volume> -V`
    pub fn volume_statistics(volume: &str) -> Self {
        Self::new("fslstats").args([volume, "-V"])
    }

    /// `fast -t 1 -n 3 -H 0.1 -o <prefix> <input>`
    pub fn tissue_segmentation(input: &str, prefix: &str) -> Self {
        Self::new("fast").args(["-t", "1", "-n", "3", "-H", "0.1", "-o", prefix, input])
    }

    /// `flirt -in <input> -ref <template> -omat <matrix> -out <output>`
    pub fn registration(input: &str, template: &str, matrix: &str, output: &str) -> Self {
        Self::new("flirt").args(["-in", input, "-ref", template, "-omat", matrix, "-out", output])
    }

    /// `run_first_all -i <input> -o <prefix>`
    pub fn subcortical_segmentation(input: &str, prefix: &str) -> Self {
        Self::new("run_first_all").args(["-i", input, "-o", prefix])
    }

    /// `fslmaths <segmentation> -thr <label> -uthr <label> <mask>`
    pub fn label_mask(segmentation: &str, label: u32, mask: &str) -> Self {
        let label = label.to_string();
        Self::new("fslmaths").args([segmentation, "-thr", &label, "-uthr", &label, mask])
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}
