//! Unit tests for staged_pipeline.rs

use super::*;
use glam::Mat4;
use crate::error::Error;
use crate::render_queue::Renderable;
use crate::render_stage::{RenderStage, StageStatus};
use crate::renderer::mock_renderer::MockRenderer;
use crate::target::TargetOp;

fn pipeline() -> StagedPipeline {
    StagedPipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn test_new_builds_queues_stages_and_base_targets() {
    let p = pipeline();

    assert_eq!(p.queues().render_queue_names(), queue_names::DEFAULT_QUEUE_ORDER.to_vec());
    assert_eq!(p.stages().stage_count(), 13);
    assert!(p.targets().render_target(RenderTargetId::LDR_SCENE_COLOR).is_some());
    assert!(p.targets().render_target(RenderTargetId::FINAL_LDR_BUFFER).is_some());
    assert!(p.targets().render_target(RenderTargetId::POST_PROCESS).is_some());
    assert!(p.targets().render_target(RenderTargetId::GLOW).is_none());
    assert_eq!(p.frame_count(), 0);
}

#[test]
fn test_submit_to_unknown_queue() {
    let mut p = pipeline();
    let result = p.submit("Missing", Renderable::new(1, Mat4::IDENTITY));
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_render_executes_and_resets_queues() {
    let mut p = pipeline();
    let mut renderer = MockRenderer::new();

    p.submit(queue_names::OPAQUE, Renderable::new(1, Mat4::IDENTITY)).unwrap();
    p.submit(queue_names::OPAQUE, Renderable::new(2, Mat4::IDENTITY)).unwrap();
    p.submit(queue_names::UI, Renderable::new(3, Mat4::IDENTITY)).unwrap();
    p.render(&mut renderer).unwrap();

    let opaque = renderer.executed.iter().position(|q| q == "Opaque").unwrap();
    assert_eq!(renderer.executed_sizes[opaque], 2);
    let ui = renderer.executed.iter().position(|q| q == "UI").unwrap();
    assert_eq!(renderer.executed_sizes[ui], 1);
    assert!(opaque < ui);

    assert!(p.queues().iter().all(|q| q.is_empty()));
    assert_eq!(p.frame_count(), 1);
    assert_eq!(p.targets().bound_render_target(), None);
}

#[test]
fn test_render_continues_after_stage_failure() {
    let mut p = pipeline();
    let mut renderer = MockRenderer::failing_on("Opaque");

    p.submit(queue_names::UI, Renderable::new(1, Mat4::IDENTITY)).unwrap();
    assert!(p.render(&mut renderer).is_ok());

    assert!(renderer.executed.iter().any(|q| q == "UI"));
    assert!(!renderer.executed.iter().any(|q| q == "Transparent"));
    assert_eq!(p.frame_count(), 1);
}

#[test]
fn test_editor_mode_toggles_editor_stages_and_scene_clear() {
    let mut p = pipeline();
    let config = p.config().clone();

    p.set_editor_mode(true).unwrap();
    assert!(p.config().editor_mode);
    for id in [RenderStageId::EditorBackground, RenderStageId::EditorForeground] {
        assert_eq!(p.stages().render_stage_by_id(id).unwrap().state().status(), StageStatus::Enabled);
    }
    let ldr = p.stages_mut().stage_by_id_mut::<QueueRenderStage>(RenderStageId::LdrSceneColor).unwrap();
    assert_eq!(ldr.clear_values(), ClearValues::depth(config.depth_clear));

    p.set_editor_mode(false).unwrap();
    assert_eq!(
        p.stages().render_stage_by_id(RenderStageId::EditorBackground).unwrap().state().status(),
        StageStatus::Disabled
    );
    let ldr = p.stages_mut().stage_by_id_mut::<QueueRenderStage>(RenderStageId::LdrSceneColor).unwrap();
    assert_eq!(ldr.clear_values(), ClearValues::color_depth(config.clear_color, config.depth_clear));
}

#[test]
fn test_editor_background_renders_first() {
    let mut p = pipeline();
    let mut renderer = MockRenderer::new();
    p.set_editor_mode(true).unwrap();
    p.targets_mut().take_journal();

    p.render(&mut renderer).unwrap();

    assert_eq!(renderer.executed[0], "EditorBackground");
    assert_eq!(renderer.executed.last().map(String::as_str), Some("EditorForeground"));
    // Editor background clears color, the scene stage then only clears depth
    let journal = p.targets().journal();
    assert_eq!(
        journal[0],
        TargetOp::Begin { id: RenderTargetId::LDR_SCENE_COLOR, clear: ClearValues::color_depth([0.0, 0.0, 0.0, 1.0], 1.0) }
    );
    assert_eq!(journal[1], TargetOp::End(RenderTargetId::LDR_SCENE_COLOR));
    assert_eq!(
        journal[2],
        TargetOp::Begin { id: RenderTargetId::LDR_SCENE_COLOR, clear: ClearValues::depth(1.0) }
    );
}

#[test]
fn test_render_target_memory_tracks_targets() {
    let mut p = pipeline();
    let before = p.render_target_memory();
    assert_eq!(before, p.targets().memory_size());

    p.set_hdr(true).unwrap();
    assert_eq!(p.render_target_memory() - before, 1280 * 720 * (8 + 4));
}

#[test]
fn test_set_hdr_renders_scene_once_into_scene_color() {
    let mut p = pipeline();
    let mut renderer = MockRenderer::new();
    p.set_hdr(true).unwrap();

    p.submit(queue_names::OPAQUE, Renderable::new(1, Mat4::IDENTITY)).unwrap();
    p.render(&mut renderer).unwrap();

    assert_eq!(renderer.executed.iter().filter(|q| *q == "Opaque").count(), 1);
    assert_eq!(renderer.effects[0].1, RenderTargetId::SCENE_COLOR);
    assert!(p.config().hdr);
}

#[test]
fn test_scene_color_stages_switch_as_a_pair() {
    let mut p = pipeline();
    let post_source = |p: &mut StagedPipeline| {
        p.stages_mut()
            .stage_by_id_mut::<PostProcessRenderStage>(RenderStageId::PostProcess)
            .unwrap()
            .source()
    };

    p.set_stage_enable(RenderStageId::HdrSceneColor, true).unwrap();
    assert!(p.stages().render_stage_by_id(RenderStageId::HdrSceneColor).unwrap().state().is_enabled());
    assert!(!p.stages().render_stage_by_id(RenderStageId::LdrSceneColor).unwrap().state().is_enabled());
    assert_eq!(post_source(&mut p), RenderTargetId::SCENE_COLOR);
    let background = p
        .stages_mut()
        .stage_by_id_mut::<QueueRenderStage>(RenderStageId::EditorBackground)
        .unwrap();
    assert_eq!(background.target(), RenderTargetId::SCENE_COLOR);

    p.set_hdr(false).unwrap();
    assert!(p.stages().render_stage_by_id(RenderStageId::LdrSceneColor).unwrap().state().is_enabled());
    assert!(!p.stages().render_stage_by_id(RenderStageId::HdrSceneColor).unwrap().state().is_enabled());
    assert_eq!(post_source(&mut p), RenderTargetId::LDR_SCENE_COLOR);
    assert!(!p.config().hdr);
}

#[test]
fn test_screen_resize() {
    let mut p = pipeline();
    p.on_screen_size_changed(640, 480);

    let ldr = p.targets().render_target(RenderTargetId::LDR_SCENE_COLOR).unwrap();
    assert_eq!((ldr.width, ldr.height), (640, 480));
    assert_eq!(p.config().screen_width, 640);

    p.on_screen_size_changed(0, 480);
    assert_eq!(p.targets().screen_size(), (640, 480));
}

#[test]
fn test_destroy_releases_everything() {
    let mut p = pipeline();
    p.submit(queue_names::OPAQUE, Renderable::new(1, Mat4::IDENTITY)).unwrap();
    p.destroy();

    assert_eq!(p.targets().render_target_count(), 1);
    assert_eq!(p.queues().render_queue_count(), 0);
    assert!(p.stages().render_stage_by_id(RenderStageId::Ui).unwrap().state().is_destroyed());
}
