use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec3};
use crate::config::PipelineConfig;
use crate::error::Error;
use crate::render_queue::Renderable;
use crate::render_stage::test_fixture::{Fixture, RecordingStage};
use crate::render_stage::{
    queue_names, GlowRenderStage, PostProcessRenderStage, QueueRenderStage, RenderStage,
    RenderStageId, StageState, StageStatus,
};
use crate::target::{ClearValues, RenderTargetId, RenderTargetManager, TargetOp};
use super::*;

fn default_manager(fx: &mut Fixture) -> RenderStageManager {
    let config = fx.config.clone();
    let manager = RenderStageManager::with_default_stages(&mut fx.targets, &config).unwrap();
    fx.targets.take_journal();
    manager
}

fn submit(fx: &mut Fixture, queue: &str) {
    fx.queues
        .render_queue_mut(queue)
        .unwrap()
        .add_renderable(Renderable::new(1, Mat4::IDENTITY));
}

// ============================================================================
// STAGE STATE
// ============================================================================

#[test]
fn test_stage_state_transitions() {
    let mut state = StageState::new(true);
    assert_eq!(state.status(), StageStatus::Uninitialized);

    assert!(state.mark_initialized());
    assert_eq!(state.status(), StageStatus::Enabled);
    assert!(!state.mark_initialized());
    assert_eq!(state.init_count(), 1);

    state.set_enabled(false);
    assert_eq!(state.status(), StageStatus::Disabled);

    state.mark_destroyed();
    assert_eq!(state.status(), StageStatus::Destroyed);
    assert!(!state.is_active());
}

// ============================================================================
// REGISTRATION / ORDER
// ============================================================================

#[test]
fn test_processing_follows_id_order_not_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut manager = RenderStageManager::new();
    for id in [RenderStageId::Ui, RenderStageId::Coverage, RenderStageId::Glow, RenderStageId::EditorBackground] {
        manager.register_stage(RecordingStage::boxed(id, &log)).unwrap();
    }

    let mut fx = Fixture::new(PipelineConfig::default());
    assert_eq!(manager.process_render_stages(&mut fx.ctx()), 0);

    assert_eq!(
        *log.borrow(),
        vec![RenderStageId::EditorBackground, RenderStageId::Coverage, RenderStageId::Glow, RenderStageId::Ui]
    );
    assert_eq!(manager.stage_ids(), *log.borrow());
}

#[test]
fn test_duplicate_registration_fails() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut manager = RenderStageManager::new();
    manager.register_stage(RecordingStage::boxed(RenderStageId::Ui, &log)).unwrap();

    assert!(manager.register_stage(RecordingStage::boxed(RenderStageId::Ui, &log)).is_err());
    assert_eq!(manager.stage_count(), 1);
}

#[test]
fn test_failing_stage_does_not_stop_the_frame() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut manager = RenderStageManager::new();
    manager.register_stage(RecordingStage::failing(RenderStageId::PostProcess, &log)).unwrap();
    manager.register_stage(RecordingStage::boxed(RenderStageId::Ui, &log)).unwrap();

    let mut fx = Fixture::new(PipelineConfig::default());
    assert_eq!(manager.process_render_stages(&mut fx.ctx()), 1);
    assert_eq!(*log.borrow(), vec![RenderStageId::PostProcess, RenderStageId::Ui]);
}

#[test]
fn test_background_opaque_disabled_post_process_ui() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let config = fx.config.clone();
    let ldr = RenderTargetId::LDR_SCENE_COLOR;
    let clear = ClearValues::color_depth(config.clear_color, config.depth_clear);

    let mut manager = RenderStageManager::new();
    manager.register_stage(Box::new(QueueRenderStage::ui())).unwrap();
    manager.register_stage(Box::new(PostProcessRenderStage::new(&config, false))).unwrap();
    manager
        .register_stage(Box::new(QueueRenderStage::single(
            RenderStageId::LdrSceneColor,
            ldr,
            ClearValues::none(),
            queue_names::OPAQUE,
            true,
        )))
        .unwrap();
    manager
        .register_stage(Box::new(QueueRenderStage::single(
            RenderStageId::EditorBackground,
            ldr,
            clear,
            queue_names::BACKGROUND,
            true,
        )))
        .unwrap();
    for id in manager.stage_ids() {
        manager.set_stage_enable(id, id != RenderStageId::PostProcess, &mut fx.targets, &config).unwrap();
    }
    submit(&mut fx, queue_names::OPAQUE);

    assert_eq!(manager.process_render_stages(&mut fx.ctx()), 0);

    assert_eq!(fx.renderer.executed, vec!["Background", "Opaque", "UI"]);
    assert_eq!(
        fx.targets.take_journal(),
        vec![
            TargetOp::Begin { id: ldr, clear },
            TargetOp::End(ldr),
            TargetOp::Begin { id: ldr, clear: ClearValues::none() },
            TargetOp::End(ldr),
            TargetOp::Update { src: ldr, dst: RenderTargetId::FINAL_LDR_BUFFER },
            TargetOp::Begin { id: RenderTargetId::DEFAULT_BACK_BUFFER, clear: ClearValues::none() },
            TargetOp::End(RenderTargetId::DEFAULT_BACK_BUFFER),
        ]
    );
    assert_eq!(
        manager.render_stage_by_id(RenderStageId::PostProcess).unwrap().state().status(),
        StageStatus::Uninitialized
    );
}

// ============================================================================
// DEFAULT STAGES
// ============================================================================

#[test]
fn test_default_stage_set() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let manager = default_manager(&mut fx);

    assert_eq!(manager.stage_ids(), RenderStageId::ALL.to_vec());

    let status = |id| manager.render_stage_by_id(id).unwrap().state().status();
    assert_eq!(status(RenderStageId::LdrSceneColor), StageStatus::Enabled);
    assert_eq!(status(RenderStageId::HdrSceneColor), StageStatus::Uninitialized);
    assert_eq!(status(RenderStageId::PostProcess), StageStatus::Enabled);
    assert_eq!(status(RenderStageId::Glow), StageStatus::Uninitialized);
    assert_eq!(status(RenderStageId::EditorBackground), StageStatus::Uninitialized);
    assert_eq!(status(RenderStageId::ShadowMap), StageStatus::Enabled);

    assert!(fx.targets.render_target(RenderTargetId::POST_PROCESS).is_some());
    assert!(fx.targets.render_target(RenderTargetId::SHADOW_MAP).is_some());
    assert!(fx.targets.render_target(RenderTargetId::SCENE_COLOR).is_none());
}

#[test]
fn test_default_frame_order() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);

    assert_eq!(manager.process_render_stages(&mut fx.ctx()), 0);

    // Enabled queue stages only, in stage order
    assert_eq!(
        fx.renderer.executed,
        vec![
            "Background", "Opaque", "Transparent", "Effect",
            "AfterPostProcess", "Reflective", "ShadowMap", "Skeletal2d", "UI",
        ]
    );
    let journal = fx.targets.take_journal();
    assert!(journal.contains(&TargetOp::Update {
        src: RenderTargetId::FINAL_LDR_BUFFER,
        dst: RenderTargetId::DEFAULT_BACK_BUFFER,
    }));
}

#[test]
fn test_disabled_scene_stage_leaves_queues_to_hdr_stage() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();
    manager
        .set_stage_enable(RenderStageId::LdrSceneColor, false, &mut fx.targets, &config)
        .unwrap();
    manager
        .set_stage_enable(RenderStageId::HdrSceneColor, true, &mut fx.targets, &config)
        .unwrap();
    submit(&mut fx, queue_names::OPAQUE);
    fx.targets.take_journal();

    manager.process_render_stages(&mut fx.ctx());

    let opaque = fx.renderer.executed.iter().position(|q| q == "Opaque").unwrap();
    assert_eq!(fx.renderer.executed_sizes[opaque], 1);
    assert_eq!(fx.renderer.executed.iter().filter(|q| *q == "Opaque").count(), 1);
    let journal = fx.targets.journal();
    assert!(journal.iter().any(|op| matches!(op, TargetOp::Begin { id, .. } if *id == RenderTargetId::SCENE_COLOR)));
    assert!(!journal.iter().any(|op| matches!(op, TargetOp::Begin { id, .. } if *id == RenderTargetId::LDR_SCENE_COLOR)));
}

#[test]
fn test_double_enable_initializes_once() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();

    manager.set_stage_enable(RenderStageId::Glow, true, &mut fx.targets, &config).unwrap();
    manager.set_stage_enable(RenderStageId::Glow, true, &mut fx.targets, &config).unwrap();

    let glow = manager.stage::<GlowRenderStage>().unwrap();
    assert_eq!(glow.state().init_count(), 1);
    let creates = fx
        .targets
        .journal()
        .iter()
        .filter(|op| **op == TargetOp::Create(RenderTargetId::GLOW))
        .count();
    assert_eq!(creates, 1);
}

#[test]
fn test_enable_hdr_creates_scene_color() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();

    manager.set_stage_enable(RenderStageId::HdrSceneColor, true, &mut fx.targets, &config).unwrap();

    assert!(fx.targets.render_target(RenderTargetId::SCENE_COLOR).is_some());
    let hdr = manager
        .stage_by_id_mut::<QueueRenderStage>(RenderStageId::HdrSceneColor)
        .unwrap();
    assert_eq!(hdr.target(), RenderTargetId::SCENE_COLOR);
    assert_eq!(hdr.queue_range(), ("Background", "Effect", true));
}

#[test]
fn test_set_enable_unknown_stage() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = RenderStageManager::new();
    let config = fx.config.clone();

    let result = manager.set_stage_enable(RenderStageId::Glow, true, &mut fx.targets, &config);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// ============================================================================
// SHADOW MAP
// ============================================================================

#[test]
fn test_shadow_map_stage_access_and_render() {
    let mut fx = Fixture::new(PipelineConfig { shadow_map_size: 1024, ..PipelineConfig::default() });
    let mut manager = default_manager(&mut fx);

    let shadow = manager.shadow_map_stage_mut().unwrap();
    assert_eq!(shadow.size(), 1024);
    shadow.set_light(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, 20.0, 100.0).unwrap();
    assert!(shadow.frustum().is_point_in(Vec3::new(5.0, 0.0, -5.0)));
    assert!(!shadow.frustum().is_point_in(Vec3::new(15.0, 0.0, 0.0)));
    assert!(shadow.set_light(Vec3::ZERO, Vec3::ZERO, 1.0, 1.0).is_err());

    let target = fx.targets.render_target(RenderTargetId::SHADOW_MAP).unwrap();
    assert_eq!((target.width, target.height), (1024, 1024));

    manager.process_render_stages(&mut fx.ctx());
    assert!(fx.targets.take_journal().contains(&TargetOp::Begin {
        id: RenderTargetId::SHADOW_MAP,
        clear: ClearValues::depth(1.0),
    }));
    assert!(manager.shadow_map_stage().is_some());
}

#[test]
fn test_shadow_map_disabled_without_size() {
    let mut fx = Fixture::new(PipelineConfig { shadow_map_size: 0, ..PipelineConfig::default() });
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();

    assert_eq!(
        manager.shadow_map_stage().unwrap().state().status(),
        StageStatus::Uninitialized
    );
    let result = manager.set_stage_enable(RenderStageId::ShadowMap, true, &mut fx.targets, &config);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

// ============================================================================
// WATER REFLECTION / DESTROY
// ============================================================================

#[test]
fn test_water_reflection_enabled_on_demand() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();
    submit(&mut fx, queue_names::WATER_REFLECTION);

    manager.process_render_stages(&mut fx.ctx());
    assert!(!fx.renderer.executed.iter().any(|q| q == "WaterReflection"));

    manager.set_stage_enable(RenderStageId::WaterReflection, true, &mut fx.targets, &config).unwrap();
    assert!(fx.targets.render_target(RenderTargetId::WATER_REFRACTION).is_some());
    submit(&mut fx, queue_names::WATER_REFLECTION);
    manager.process_render_stages(&mut fx.ctx());
    assert!(fx.renderer.executed.iter().any(|q| q == "WaterReflection"));
}

#[test]
fn test_destroy_releases_targets_and_is_terminal() {
    let mut fx = Fixture::new(PipelineConfig::default());
    let mut manager = default_manager(&mut fx);
    let config = fx.config.clone();

    manager.destroy(&mut fx.targets);

    assert!(fx.targets.render_target(RenderTargetId::POST_PROCESS).is_none());
    assert!(fx.targets.render_target(RenderTargetId::SHADOW_MAP).is_none());
    for id in manager.stage_ids() {
        assert_eq!(manager.render_stage_by_id(id).unwrap().state().status(), StageStatus::Destroyed);
    }

    manager.set_stage_enable(RenderStageId::Glow, true, &mut fx.targets, &config).unwrap();
    assert_eq!(
        manager.render_stage_by_id(RenderStageId::Glow).unwrap().state().status(),
        StageStatus::Destroyed
    );
    assert_eq!(manager.process_render_stages(&mut fx.ctx()), 0);
    assert!(fx.renderer.executed.is_empty());
}
