mod common;

use std::sync::Arc;
use tempfile::TempDir;

use common::{entries, write_video, Behaviour, FakeStep};
use videoforge::error::VideoForgeError;
use videoforge::pipeline::{PipelineExecutor, ProcessorTable, ScratchArena};
use videoforge::steps::{OutputFormat, Quality, SelectedStep, StepConfig, StepKind};

fn format_step(format: OutputFormat) -> SelectedStep {
    SelectedStep::new(StepConfig::FormatConverter { format })
}

fn speed_step(speed: f64) -> SelectedStep {
    SelectedStep::new(StepConfig::SpeedAdjuster { speed })
}

fn compress_step() -> SelectedStep {
    SelectedStep::new(StepConfig::Compressor { quality: Quality::Medium })
}

#[tokio::test]
async fn test_two_steps_thread_the_artifact_forward() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");
    let output = work.path().join("output");
    let scratch_root = work.path().join("scratch");

    let convert = Arc::new(FakeStep::new("converted", Behaviour::Copy));
    let speed = Arc::new(FakeStep::new("processed", Behaviour::Copy));
    let table = ProcessorTable::empty()
        .with(StepKind::FormatConverter, convert.clone())
        .with(StepKind::SpeedAdjuster, speed.clone());
    let executor = PipelineExecutor::new(table, "_combo_processed");

    let arena = ScratchArena::create(Some(&scratch_root)).unwrap();
    let result = {
        let scratch = arena.video_scope(1).unwrap();
        executor
            .process_single_video(&video, &[format_step(OutputFormat::Mp4), speed_step(1.5)], &output, &scratch)
            .await
            .unwrap()
    };
    arena.close().unwrap();

    assert_eq!(result, output.join("clip_combo_processed.mp4"));
    assert!(result.exists());
    assert_eq!(entries(&output), 1);
    assert_eq!(convert.calls(), 1);
    assert_eq!(speed.calls(), 1);
    assert_eq!(entries(&scratch_root), 0);
}

#[tokio::test]
async fn test_format_change_sets_final_extension() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");
    let output = work.path().join("output");

    let table = ProcessorTable::empty()
        .with(StepKind::FormatConverter, Arc::new(FakeStep::new("converted", Behaviour::Copy)));
    let executor = PipelineExecutor::new(table, "_combo_processed");

    let arena = ScratchArena::create(None).unwrap();
    let scratch = arena.video_scope(1).unwrap();
    let result = executor
        .process_single_video(&video, &[format_step(OutputFormat::Mkv)], &output, &scratch)
        .await
        .unwrap();

    assert_eq!(result, output.join("clip_combo_processed.mkv"));
}

#[tokio::test]
async fn test_failing_step_stops_the_video() {
    for failing in 1..=3 {
        let work = TempDir::new().unwrap();
        let video = write_video(work.path(), "clip.mp4");
        let output = work.path().join("output");

        let behaviour = |step: usize| if step == failing { Behaviour::Fail } else { Behaviour::Copy };
        let first = Arc::new(FakeStep::new("one", behaviour(1)));
        let second = Arc::new(FakeStep::new("two", behaviour(2)));
        let third = Arc::new(FakeStep::new("three", behaviour(3)));
        let table = ProcessorTable::empty()
            .with(StepKind::FormatConverter, first.clone())
            .with(StepKind::Compressor, second.clone())
            .with(StepKind::SpeedAdjuster, third.clone());
        let executor = PipelineExecutor::new(table, "_combo_processed");

        let arena = ScratchArena::create(None).unwrap();
        let scratch = arena.video_scope(1).unwrap();
        let steps = [format_step(OutputFormat::Mp4), compress_step(), speed_step(2.0)];
        let result = executor.process_single_video(&video, &steps, &output, &scratch).await;

        match result {
            Err(VideoForgeError::StepFailed { step, .. }) => assert_eq!(step, failing),
            other => panic!("step {} should fail, got {:?}", failing, other),
        }
        assert!(!output.join("clip_combo_processed.mp4").exists());

        // nothing runs after the failing step
        let calls = [first.calls(), second.calls(), third.calls()];
        for (i, count) in calls.iter().enumerate() {
            assert_eq!(*count, usize::from(i + 1 <= failing), "step {} when {} fails", i + 1, failing);
        }
    }
}

#[tokio::test]
async fn test_success_without_artifact_is_missing_artifact() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");
    let output = work.path().join("output");

    let table = ProcessorTable::empty()
        .with(StepKind::Compressor, Arc::new(FakeStep::new("silent", Behaviour::NoOutput)));
    let executor = PipelineExecutor::new(table, "_combo_processed");

    let arena = ScratchArena::create(None).unwrap();
    let scratch = arena.video_scope(1).unwrap();
    let result = executor
        .process_single_video(&video, &[compress_step()], &output, &scratch)
        .await;

    assert!(matches!(result, Err(VideoForgeError::MissingArtifact { step: 1, .. })));
    assert_eq!(entries(&output), 0);
}

#[tokio::test]
async fn test_two_artifacts_is_inconsistent() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");
    let output = work.path().join("output");

    let table = ProcessorTable::empty()
        .with(StepKind::Compressor, Arc::new(FakeStep::new("double", Behaviour::TwoOutputs)));
    let executor = PipelineExecutor::new(table, "_combo_processed");

    let arena = ScratchArena::create(None).unwrap();
    let scratch = arena.video_scope(1).unwrap();
    let result = executor
        .process_single_video(&video, &[compress_step()], &output, &scratch)
        .await;

    assert!(matches!(result, Err(VideoForgeError::InconsistentResult { step: 1, found: 2 })));
}

#[tokio::test]
async fn test_missing_processor_fails_the_step() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");

    let executor = PipelineExecutor::new(ProcessorTable::empty(), "_combo_processed");
    let arena = ScratchArena::create(None).unwrap();
    let scratch = arena.video_scope(1).unwrap();
    let result = executor
        .process_single_video(&video, &[compress_step()], &work.path().join("output"), &scratch)
        .await;

    assert!(matches!(result, Err(VideoForgeError::StepFailed { step: 1, .. })));
}

#[tokio::test]
async fn test_rerun_produces_identical_output() {
    let work = TempDir::new().unwrap();
    let video = write_video(work.path(), "clip.mp4");
    let output = work.path().join("output");

    let table = ProcessorTable::empty()
        .with(StepKind::SpeedAdjuster, Arc::new(FakeStep::new("processed", Behaviour::Copy)));
    let executor = PipelineExecutor::new(table, "_combo_processed");

    let mut contents = Vec::new();
    for _ in 0..2 {
        let arena = ScratchArena::create(None).unwrap();
        let scratch = arena.video_scope(1).unwrap();
        let result = executor
            .process_single_video(&video, &[speed_step(1.5)], &output, &scratch)
            .await
            .unwrap();
        contents.push(std::fs::read(result).unwrap());
    }

    assert_eq!(contents[0], contents[1]);
    assert_eq!(entries(&output), 1);
}
