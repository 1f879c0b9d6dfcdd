//! Pipeline completo contra un invoker con salidas predefinidas.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mri_adapters::steps::ids;
use mri_adapters::{MriPipeline, PipelineState, RunContext, StructureLabels};
use mri_core::CoreEngineError;
use mri_toolkit::{CannedResponse, ScriptedInvoker};

const WHOLE_BRAIN: &str = "0 4095 312.5 120000 96000 300 55.2";
const TISSUE: &str = "10000 8000.0";
const HIPPO: &str = "500 400.0";

fn scripted(dir: &Path) -> ScriptedInvoker {
    ScriptedInvoker::new().in_dir(dir)
                          .on_arg("fslstats", "brain_extracted.nii.gz", CannedResponse::stdout(WHOLE_BRAIN))
                          .on_arg("fslstats", "left_hippocampus.nii.gz", CannedResponse::stdout(HIPPO))
                          .on_arg("fslstats", "right_hippocampus.nii.gz", CannedResponse::stdout(HIPPO))
                          .on_program("fslstats", CannedResponse::stdout(TISSUE))
}

fn run(dir: &Path, invoker: ScriptedInvoker, input: &str) -> (MriPipeline, Arc<ScriptedInvoker>, Result<mri_adapters::PipelineOutcome, CoreEngineError>) {
    let inv = Arc::new(invoker);
    let mut pipeline = MriPipeline::new(RunContext::new(dir), inv.clone());
    let res = pipeline.run(input);
    (pipeline, inv, res)
}

#[test]
fn end_to_end_report_contains_tool_values() {
    let dir = tempfile::tempdir().unwrap();
    let (pipeline, inv, res) = run(dir.path(), scripted(dir.path()), "scan.nii.gz");
    let outcome = res.expect("pipeline ok");

    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(outcome.report_path, dir.path().join("advanced_mri_report.txt"));
    assert!(outcome.empty_structures.is_empty());
    assert!(outcome.flow_fingerprint.is_some());

    let text = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(text.contains("Input File: scan.nii.gz"));
    assert!(text.contains("Brain Volume: 96000 mm³ (from 120000 voxels)"));
    assert!(text.contains("Left Hippocampus Volume: 400.0 mm³ (from 500 voxels)"));
    assert!(text.contains("Gray Matter Volume: 8000.0 mm³ (from 10000 voxels)"));
    assert_eq!(text.lines().filter(|l| l.contains(" Volume: ")).count(), 6);
    assert_eq!(text.lines().filter(|l| *l == "Advanced MRI Analysis Report").count(), 1);
    assert_eq!(text.lines().filter(|l| l.starts_with("Input File: ")).count(), 1);

    assert_eq!(inv.programs(),
               vec!["bet", "fslstats", "fast", "fslstats", "fslstats", "fslstats", "flirt", "run_first_all",
                    "fslmaths", "fslmaths", "fslstats", "fslstats"]);
}

#[test]
fn command_lines_keep_fixed_flags() {
    let dir = tempfile::tempdir().unwrap();
    let inv = Arc::new(scripted(dir.path()));
    let ctx = RunContext::new(dir.path()).with_toolkit_root("/opt/fsl");
    MriPipeline::new(ctx, inv.clone()).run("scan.nii.gz").unwrap();

    let lines: Vec<String> = inv.calls().iter().map(|c| c.to_string()).collect();
    let expected = ["bet scan.nii.gz brain_extracted.nii.gz -f 0.5 -g 0",
                    "fslstats brain_extracted.nii.gz -R -M -V -P 50 -S",
                    "fast -t 1 -n 3 -H 0.1 -o fast_output brain_extracted.nii.gz",
                    "fslstats fast_output_pve_0.nii.gz -V",
                    "fslstats fast_output_pve_1.nii.gz -V",
                    "fslstats fast_output_pve_2.nii.gz -V",
                    "flirt -in brain_extracted.nii.gz -ref /opt/fsl/data/standard/MNI152_T1_1mm_brain.nii.gz -omat brain2mni.mat -out brain_mni.nii.gz",
                    "run_first_all -i brain_mni.nii.gz -o first_output",
                    "fslmaths first_output_all_fast_firstseg.nii.gz -thr 17 -uthr 17 left_hippocampus.nii.gz",
                    "fslmaths first_output_all_fast_firstseg.nii.gz -thr 53 -uthr 53 right_hippocampus.nii.gz",
                    "fslstats left_hippocampus.nii.gz -V",
                    "fslstats right_hippocampus.nii.gz -V"];
    assert_eq!(lines, expected);
}

#[test]
fn configured_labels_reach_fslmaths() {
    let dir = tempfile::tempdir().unwrap();
    let inv = Arc::new(scripted(dir.path()));
    let ctx = RunContext::new(dir.path()).with_labels(StructureLabels { left: 10, right: 49 });
    MriPipeline::new(ctx, inv.clone()).run("scan.nii.gz").unwrap();

    let masks: Vec<Vec<String>> = inv.calls().into_iter().filter(|c| c.program == "fslmaths").map(|c| c.args).collect();
    assert_eq!(masks[0][1..5], ["-thr", "10", "-uthr", "10"]);
    assert_eq!(masks[1][1..5], ["-thr", "49", "-uthr", "49"]);
}

#[test]
fn whole_brain_arity_mismatch_aborts_without_touching_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("advanced_mri_report.txt");
    fs::write(&report, "previous run").unwrap();

    let inv = ScriptedInvoker::new().on_arg("fslstats", "brain_extracted.nii.gz", CannedResponse::stdout("1 2 3 4 5 6"));
    let (pipeline, inv, res) = run(dir.path(), inv, "scan.nii.gz");

    let err = res.unwrap_err();
    assert!(matches!(&err, CoreEngineError::OutputParse { expected: 7, found: 6, .. }), "{err:?}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(pipeline.state(), PipelineState::Aborted);
    assert_eq!(pipeline.failure(), Some(err));
    assert_eq!(inv.programs(), vec!["bet", "fslstats"]);
    assert_eq!(fs::read_to_string(&report).unwrap(), "previous run");
}

#[test]
fn tissue_statistics_are_strict() {
    let dir = tempfile::tempdir().unwrap();
    let inv = ScriptedInvoker::new().on_arg("fslstats", "brain_extracted.nii.gz", CannedResponse::stdout(WHOLE_BRAIN))
                                    .on_arg("fslstats", "fast_output_pve_1.nii.gz", CannedResponse::stdout("0"))
                                    .on_program("fslstats", CannedResponse::stdout(TISSUE));
    let (pipeline, _, res) = run(dir.path(), inv, "scan.nii.gz");

    match res {
        Err(CoreEngineError::OutputParse { stage, expected: 2, found: 1, .. }) => assert_eq!(stage, ids::TISSUE_STATS),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(pipeline.state(), PipelineState::Aborted);
    assert!(!dir.path().join("advanced_mri_report.txt").exists());
}

#[test]
fn empty_hippocampus_defaults_to_zero_and_completes() {
    let dir = tempfile::tempdir().unwrap();
    let inv = ScriptedInvoker::new().in_dir(dir.path())
                                    .on_arg("fslstats", "brain_extracted.nii.gz", CannedResponse::stdout(WHOLE_BRAIN))
                                    .on_arg("fslstats", "left_hippocampus.nii.gz", CannedResponse::stdout(""))
                                    .on_arg("fslstats", "right_hippocampus.nii.gz", CannedResponse::stdout("0"))
                                    .on_program("fslstats", CannedResponse::stdout(TISSUE));
    let (pipeline, _, res) = run(dir.path(), inv, "scan.nii.gz");
    let outcome = res.unwrap();

    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(outcome.empty_structures, vec!["left_hippocampus", "right_hippocampus"]);
    let text = fs::read_to_string(outcome.report_path).unwrap();
    assert!(text.contains("Left Hippocampus Volume: 0 mm³ (from 0 voxels)"));
    assert!(text.contains("Right Hippocampus Volume: 0 mm³ (from 0 voxels)"));

    let variants = pipeline.engine().event_variants().unwrap();
    assert_eq!(variants.iter().filter(|v| **v == "G").count(), 2);
    assert_eq!(variants.last(), Some(&"C"));
}

#[test]
fn img_input_is_converted_before_brain_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let inv = scripted(dir.path()).on_program("fslchfiletype", CannedResponse::ok().touching("scan.nii.gz"));
    let (pipeline, inv, res) = run(dir.path(), inv, "scan.img");
    let outcome = res.unwrap();

    let calls = inv.calls();
    assert_eq!(calls[0].to_string(), "fslchfiletype NIFTI_GZ scan.img scan.nii.gz");
    assert_eq!(calls[1].program, "bet");
    assert_eq!(calls[1].args[0], "scan.nii.gz");
    assert!(dir.path().join("scan.nii.gz").exists());
    assert_eq!(outcome.report.input_file, "scan.img");
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[test]
fn missing_converted_file_aborts_before_brain_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let (pipeline, inv, res) = run(dir.path(), scripted(dir.path()), "scan.img");

    assert_eq!(res.unwrap_err(), CoreEngineError::MissingArtifact("scan.nii.gz".into()));
    assert_eq!(inv.programs(), vec!["fslchfiletype"]);
    assert_eq!(pipeline.state(), PipelineState::Aborted);
}

#[test]
fn failing_stage_propagates_exit_code_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let inv = scripted(dir.path()).on_program("fast", CannedResponse::fail(5, "segmentation failed"));
    let (pipeline, inv, res) = run(dir.path(), inv, "scan.nii.gz");

    let err = res.unwrap_err();
    assert_eq!(err,
               CoreEngineError::StageExecution { stage: ids::TISSUE_SEGMENTATION.into(),
                                                 exit_code: 5,
                                                 stderr: "segmentation failed".into() });
    assert_eq!(err.exit_code(), 5);
    assert_eq!(inv.programs().last().map(String::as_str), Some("fast"));
    assert!(!inv.programs().iter().any(|p| p == "flirt"));
    assert_eq!(pipeline.engine().event_variants().unwrap().last(), Some(&"X"));
}

#[test]
fn stage_timeout_aborts_with_124_and_leaves_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let inv = scripted(dir.path()).on_program("flirt", CannedResponse::timeout(30));
    let (pipeline, inv, res) = run(dir.path(), inv, "scan.nii.gz");

    let err = res.unwrap_err();
    assert_eq!(err, CoreEngineError::StageTimeout { stage: ids::REGISTRATION.into(), seconds: 30 });
    assert_eq!(err.exit_code(), 124);
    assert_eq!(pipeline.state(), PipelineState::Aborted);
    assert_eq!(inv.programs().last().map(String::as_str), Some("flirt"));
    assert!(!inv.programs().iter().any(|p| p == "run_first_all"));
    assert!(!dir.path().join("advanced_mri_report.txt").exists());
}

#[test]
fn stages_are_registered_in_execution_order() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = MriPipeline::new(RunContext::new(dir.path()), Arc::new(scripted(dir.path())));
    let definition = pipeline.engine().default_definition().expect("definition");
    assert_eq!(definition.step_ids(), ids::ALL);
}

#[test]
fn second_run_overwrites_first_report() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), scripted(dir.path()), "first.nii.gz").2.unwrap();
    let outcome = run(dir.path(), scripted(dir.path()), "second.nii.gz").2.unwrap();

    let text = fs::read_to_string(outcome.report_path).unwrap();
    assert!(text.contains("Input File: second.nii.gz"));
    assert!(!text.contains("first.nii.gz"));
}

#[test]
fn pipeline_instance_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, _, res) = run(dir.path(), scripted(dir.path()), "scan.nii.gz");
    res.unwrap();
    assert!(matches!(pipeline.run("scan.nii.gz"), Err(CoreEngineError::Internal(_))));
}
