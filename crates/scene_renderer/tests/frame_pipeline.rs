//! End-to-end frame tests against the recording context
//!
//! Builds small scenes through the public API and checks draw order,
//! culling, lighting strategies and state hygiene across whole frames.

use approx::assert_relative_eq;
use scene_renderer::prelude::*;
use scene_renderer::render::{BlendFunc, DepthFunc, Projection, RenderState, UniformValue};
use scene_renderer::scene::{RenderCallCollector, RenderQueue};

struct TestScene {
    resources: ResourceRegistry,
    library: PrefabLibrary,
    scene: Scene,
    cube: MeshHandle,
    opaque: MaterialHandle,
    glass: MaterialHandle,
}

impl TestScene {
    fn new() -> Self {
        let mut resources = ResourceRegistry::new();
        let cube = resources.add_mesh(Mesh::cube("cube"));
        let opaque = resources.add_material(Material::new().with_name("opaque"));
        let glass = resources
            .add_material(Material::new().with_name("glass").with_alpha_mode(AlphaMode::Blend));

        let mut scene = Scene::new();
        scene.main_camera = Camera::perspective(Vec3::zeros(), 60.0, 16.0 / 9.0, 0.1, 500.0);
        scene.main_camera.look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y());

        Self { resources, library: PrefabLibrary::new(), scene, cube, opaque, glass }
    }

    /// Place a single-node prefab `distance` units in front of the camera
    fn place(&mut self, name: &str, material: MaterialHandle, distance: f32) {
        let node = SceneNode::new(name).with_drawable(self.cube, material);
        let prefab = self.library.insert(Prefab::new(name, node));
        let model = Mat4::new_translation(&Vec3::new(0.0, 0.0, -distance));
        self.scene.add_prefab(PrefabEntity::with_prefab(name, prefab, model));
    }

    fn collect(&self) -> RenderQueue {
        let mut queue = RenderQueue::new();
        RenderCallCollector::new().collect(
            &self.scene,
            &self.scene.main_camera,
            &self.resources,
            queue.calls_mut(),
        );
        queue.sort();
        queue
    }

    fn distances(&self) -> Vec<f32> {
        self.collect().calls().iter().map(|call| call.distance_to_camera).collect()
    }
}

#[test]
fn opaque_cube_precedes_nearer_blend_quad() {
    let mut test = TestScene::new();
    test.place("quad", test.glass, 5.0);
    test.place("cube", test.opaque, 10.0);

    let queue = test.collect();
    let materials: Vec<_> = queue.calls().iter().map(|call| call.material).collect();
    assert_eq!(materials, vec![test.opaque, test.glass]);
}

#[test]
fn opaque_objects_front_to_back() {
    let mut test = TestScene::new();
    test.place("far", test.opaque, 7.0);
    test.place("near", test.opaque, 3.0);

    let distances = test.distances();
    assert_relative_eq!(distances[0], 3.0, epsilon = 1e-4);
    assert_relative_eq!(distances[1], 7.0, epsilon = 1e-4);
}

#[test]
fn blend_objects_back_to_front() {
    let mut test = TestScene::new();
    test.place("near", test.glass, 2.0);
    test.place("far", test.glass, 9.0);

    let distances = test.distances();
    assert_relative_eq!(distances[0], 9.0, epsilon = 1e-4);
    assert_relative_eq!(distances[1], 2.0, epsilon = 1e-4);
}

#[test]
fn blend_partition_follows_every_opaque_record() {
    let mut test = TestScene::new();
    for (i, distance) in [4.0, 12.0, 6.0, 20.0, 3.0, 15.0].into_iter().enumerate() {
        let material = if i % 2 == 0 { test.opaque } else { test.glass };
        test.place(&format!("object{i}"), material, distance);
    }

    let queue = test.collect();
    let calls = queue.calls();
    let last_opaque = calls.iter().rposition(|call| !call.is_blended());
    let first_blend = calls.iter().position(RenderCall::is_blended);
    assert!(last_opaque < first_blend);

    for pair in calls.windows(2) {
        match (pair[0].is_blended(), pair[1].is_blended()) {
            (false, false) => assert!(pair[0].distance_to_camera <= pair[1].distance_to_camera),
            (true, true) => assert!(pair[0].distance_to_camera >= pair[1].distance_to_camera),
            _ => {}
        }
    }
}

#[test]
fn culled_and_hidden_nodes_are_not_collected() {
    let mut test = TestScene::new();
    test.place("visible", test.opaque, 10.0);
    test.place("behind", test.opaque, -10.0);
    test.place("hidden", test.opaque, 8.0);
    if let Some(entity) = test.scene.entities.last_mut() {
        entity.common_mut().visible = false;
    }

    let queue = test.collect();
    assert_eq!(queue.len(), 1);
}

#[test]
fn collection_is_idempotent() {
    let mut test = TestScene::new();
    test.place("a", test.opaque, 4.0);
    test.place("b", test.glass, 6.0);

    let pairs = |queue: &RenderQueue| {
        queue.calls().iter().map(|call| (call.mesh, call.material)).collect::<Vec<_>>()
    };
    let first = test.collect();
    let second = test.collect();
    assert_eq!(first.len(), second.len());
    assert_eq!(pairs(&first), pairs(&second));
}

#[test]
fn directional_shadow_projection_matches_configuration() {
    let white = Vec3::new(1.0, 1.0, 1.0);
    let sun = LightEntity::directional("sun", Vec3::new(0.0, 20.0, 0.0), Vec3::zeros(), white, 1.0);
    let light = sun.with_area_size(64.0).with_max_distance(120.0);

    match light.shadow_camera.projection {
        Projection::Orthographic { left, right, bottom, top } => {
            assert_relative_eq!(left, -32.0);
            assert_relative_eq!(right, 32.0);
            assert_relative_eq!(bottom, -32.0);
            assert_relative_eq!(top, 32.0);
        }
        other => panic!("expected an orthographic shadow camera, got {other:?}"),
    }
    assert_relative_eq!(light.shadow_camera.near, -120.0);
    assert_relative_eq!(light.shadow_camera.far, 120.0);
}

#[test]
fn switching_multi_light_mode_three_times_returns_to_start() {
    let mut renderer = Renderer::new();
    let start = (renderer.multi_light_mode(), renderer.shader_name());
    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(renderer.change_multi_light_rendering());
    }
    assert_eq!((renderer.multi_light_mode(), renderer.shader_name()), start);
    assert_eq!(
        seen,
        vec![MultiLightMode::MultiPass, MultiLightMode::NoMultiLight, MultiLightMode::SinglePass]
    );
}

fn lit_scene() -> TestScene {
    let mut test = TestScene::new();
    test.place("cube", test.opaque, 10.0);
    test.scene.add_light(LightEntity::directional(
        "sun",
        Vec3::new(0.0, 10.0, -5.0),
        Vec3::new(0.0, 0.0, -10.0),
        Vec3::new(1.0, 0.9, 0.8),
        1.5,
    ));
    let red = Vec3::new(1.0, 0.0, 0.0);
    test.scene.add_light(LightEntity::point("bulb", Vec3::new(2.0, 2.0, -8.0), red, 2.0, 30.0));
    test.scene.add_light(LightEntity::spot(
        "torch",
        Vec3::new(0.0, 5.0, -5.0),
        Vec3::new(0.0, 0.0, -10.0),
        Vec3::new(0.0, 0.0, 1.0),
        1.0,
        40.0,
        30.0,
        2.0,
    ));
    test
}

#[test]
fn single_pass_frame_uploads_light_arrays() {
    let mut test = lit_scene();
    let mut context = RecordingContext::new(1280, 720);
    let mut renderer = Renderer::new();

    let stats = renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();
    assert_eq!(stats.shadow_maps, 2);

    let lit: Vec<_> =
        context.draws_into(None).into_iter().filter(|draw| draw.shader == "singlepass").collect();
    assert_eq!(lit.len(), 1);
    assert_eq!(lit[0].uniform("u_num_lights"), Some(&UniformValue::Int(3)));
    assert_eq!(lit[0].uniform("u_light_type"), Some(&UniformValue::IntArray(vec![0, 1, 2])));
}

#[test]
fn multi_pass_frame_draws_once_per_light() {
    let mut test = lit_scene();
    let mut context = RecordingContext::new(1280, 720);
    let config = RendererConfig::default().with_multi_light_mode(MultiLightMode::MultiPass);
    let mut renderer = Renderer::from_config(&config).unwrap();

    renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();

    let lit: Vec<_> =
        context.draws_into(None).into_iter().filter(|draw| draw.shader == "light").collect();
    assert_eq!(lit.len(), 3);
    assert_eq!(lit[0].state.blend, None);
    assert!(lit.iter().all(|draw| draw.state.depth_func == DepthFunc::LessEqual));
    assert!(lit[1..].iter().all(|draw| draw.state.blend == Some(BlendFunc::ADDITIVE_ALPHA)));
    assert_eq!(lit[2].uniform("u_ambient_light"), Some(&UniformValue::Vec3(Vec3::zeros())));
    assert_eq!(lit[0].uniform("u_cast_shadows"), Some(&UniformValue::Bool(true)));
    assert_eq!(lit[1].uniform("u_cast_shadows"), Some(&UniformValue::Bool(false)));
}

#[test]
fn every_frame_ends_in_baseline_state() {
    let mut test = lit_scene();
    test.place("glass", test.glass, 6.0);
    let mut context = RecordingContext::new(1280, 720);
    let mut renderer = Renderer::new();

    for frame in 0..6 {
        if frame % 2 == 1 {
            renderer.toggle_pipeline_mode();
        }
        if frame == 3 {
            renderer.set_show_gbuffers(true);
        }
        renderer.change_multi_light_rendering();
        renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();

        assert_eq!(context.current_state(), RenderState::BASELINE, "frame {frame}");
        assert_eq!(context.bound_target(), None, "frame {frame}");
        assert!(context.active_shader().is_none(), "frame {frame}");
    }
}

#[test]
fn deferred_frames_reuse_one_gbuffer_and_skip_blend() {
    let mut test = TestScene::new();
    test.place("cube", test.opaque, 10.0);
    test.place("glass", test.glass, 5.0);
    let mut context = RecordingContext::new(1280, 720);
    let config = RendererConfig::default().with_pipeline_mode(PipelineMode::Deferred);
    let mut renderer = Renderer::from_config(&config).unwrap();

    for _ in 0..3 {
        let stats = renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.skipped_translucent, 1);
    }
    assert_eq!(context.render_target_count(), 1);

    let gbuffer = renderer.gbuffer().copied().unwrap();
    assert_eq!((gbuffer.width, gbuffer.height), (1280, 720));
    let geometry = context.draws_into(Some(gbuffer.target));
    assert!(geometry.iter().all(|draw| draw.mesh() == Some(test.cube)));
}

#[test]
fn shadow_camera_follows_edited_light_fields() {
    let mut test = TestScene::new();
    test.place("cube", test.opaque, 10.0);
    test.scene.add_light(LightEntity::directional(
        "sun",
        Vec3::new(0.0, 20.0, -10.0),
        Vec3::new(0.0, 0.0, -10.0),
        Vec3::new(1.0, 1.0, 1.0),
        1.0,
    ));
    let mut context = RecordingContext::new(640, 480);
    let mut renderer = Renderer::new();

    test.scene.lights[0].area_size = 10.0;
    test.scene.lights[0].max_distance = 20.0;
    renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();

    let camera = &test.scene.lights[0].shadow_camera;
    match camera.projection {
        Projection::Orthographic { left, right, bottom, top } => {
            assert_relative_eq!(left, -5.0);
            assert_relative_eq!(right, 5.0);
            assert_relative_eq!(bottom, -5.0);
            assert_relative_eq!(top, 5.0);
        }
        other => panic!("expected an orthographic shadow camera, got {other:?}"),
    }
    assert_relative_eq!(camera.near, -20.0);
    assert_relative_eq!(camera.far, 20.0);

    test.scene.lights[0].light_type = LightType::Spot;
    test.scene.lights[0].cone_angle = 0.5;
    renderer.render_frame(&mut context, &mut test.scene, &test.resources).unwrap();

    let camera = &test.scene.lights[0].shadow_camera;
    match camera.projection {
        Projection::Perspective { fov, aspect } => {
            assert_relative_eq!(fov, 0.5);
            assert_relative_eq!(aspect, 1.0);
        }
        other => panic!("expected a perspective shadow camera, got {other:?}"),
    }
    assert_relative_eq!(camera.near, 1.0);
    assert_relative_eq!(camera.far, 20.0);
}
