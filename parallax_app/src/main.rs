//! Parallax Scrolling Demo
//!
//! Headless reproduction of the classic parallax technique with layered
//! scenes sharing one camera:
//! - Three background layers rendered with scaled camera offsets
//! - A foreground layer of palms that scrolls faster than the camera
//! - A large tile-map ground layer culled to the viewport each frame
//!
//! No window is opened; the demo pans the camera across the world and logs
//! how many draw commands each frame emits, which makes the culling
//! behavior visible in the numbers.

use rand::Rng;
use scene2d::core::config::ApplicationConfig;
use scene2d::foundation::logging;
use scene2d::foundation::math::{Color, Vec2, Vec2i};
use scene2d::scene::{Camera, Node, NodeId, RenderQueue, Scene, SceneRenderer, Viewport};
use std::path::Path;

// World extents
const BACKGROUND_WIDTH: f32 = 2640.0;
const PALM_COUNT: usize = 6;
const PALM_SIZE: (f32, f32) = (64.0, 256.0);

// Ground tile map
const GROUND_COLS: i32 = 128;
const GROUND_ROWS: i32 = 32;
const TILE_SIZE: f32 = 32.0;

// Simulation pacing
const FRAME_COUNT: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;
const CAMERA_SPEED: f32 = 100.0;

/// One independently rendered scene layer with its camera scroll factor
struct Layer {
    name: &'static str,
    scene: Scene,
    camera_factor: f32,
}

/// Candidate config locations, useful when running from the workspace root
/// or from the app directory
const CONFIG_PATHS: [&str; 2] = ["parallax.ron", "parallax_app/parallax.ron"];

fn load_config() -> ApplicationConfig {
    for path in CONFIG_PATHS {
        if Path::new(path).exists() {
            match ApplicationConfig::from_file(path) {
                Ok(config) => return config,
                Err(error) => eprintln!("ignoring config {path}: {error}"),
            }
        }
    }
    ApplicationConfig::new("Parallax Scrolling")
}

fn build_background_layer(
    name: &'static str,
    camera_factor: f32,
    anchor: Vec2,
    position: Vec2,
    tint: Color,
) -> Layer {
    let mut scene = Scene::new();
    scene.insert(
        None,
        Node::entity(Vec2::new(BACKGROUND_WIDTH, 600.0))
            .with_anchor(anchor)
            .with_position(position)
            .with_color(tint),
    );
    Layer {
        name,
        scene,
        camera_factor,
    }
}

fn build_front_layer(screen_height: f32) -> Layer {
    let mut scene = Scene::new();
    let mut rng = rand::thread_rng();

    for _ in 0..PALM_COUNT {
        let mut scale = 2.0 + rng.gen_range(0.0..2.0);
        let flipped = rng.gen_bool(0.5);
        let x = rng.gen_range(0.0..BACKGROUND_WIDTH);
        let mut node = Node::entity(Vec2::new(PALM_SIZE.0, PALM_SIZE.1))
            .with_anchor(Vec2::new(0.5, 1.0))
            .with_position(Vec2::new(x, screen_height));
        if flipped {
            scale = -scale;
        }
        node = node.with_scale(Vec2::new(scale, scale.abs()));
        scene.insert(None, node);
    }

    Layer {
        name: "front",
        scene,
        camera_factor: 1.5,
    }
}

fn build_ground_layer() -> (Layer, NodeId) {
    let mut scene = Scene::new();
    let mut rng = rand::thread_rng();

    let map_id = scene
        .create_nodes_map_with(
            None,
            Vec2i::new(GROUND_COLS, GROUND_ROWS),
            Vec2::new(TILE_SIZE, TILE_SIZE),
            Vec2::zeros(),
            |_index| {
                let shade = 0.6 + rng.gen_range(0.0..0.4);
                Node::entity(Vec2::new(TILE_SIZE, TILE_SIZE))
                    .with_anchor(Vec2::new(0.5, 1.0))
                    .with_color(Color::rgb(0.2, shade, 0.2))
            },
        )
        .expect("ground map parameters are valid");

    let layer = Layer {
        name: "ground",
        scene,
        camera_factor: 1.0,
    };
    (layer, map_id)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    logging::init_with_filter(&config.log_level);
    if let Err(error) = config.validate() {
        return Err(error.into());
    }

    let screen = config.viewport.size();
    log::info!(
        "{}: viewport {}x{}, culling {}",
        config.application_name,
        screen.x,
        screen.y,
        if config.scene.enable_culling { "on" } else { "off" }
    );

    // Layers ordered back to front, each with its own camera scroll factor
    let (ground, ground_map) = build_ground_layer();
    let mut layers = vec![
        build_background_layer(
            "far",
            0.25,
            Vec2::new(0.0, 0.5),
            Vec2::new(0.0, 0.0),
            Color::rgb(0.6, 0.7, 1.0),
        ),
        build_background_layer(
            "mid",
            0.5,
            Vec2::new(0.0, 0.5),
            Vec2::new(0.0, screen.y * 0.55),
            Color::rgb(0.8, 0.85, 1.0),
        ),
        build_background_layer(
            "near",
            1.0,
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, screen.y),
            Color::WHITE,
        ),
        ground,
        build_front_layer(screen.y),
    ];

    let renderer = SceneRenderer::new(Viewport::new(screen));
    let mut camera = Camera::new();
    let mut queue = RenderQueue::new();

    let max_x = BACKGROUND_WIDTH - screen.x;
    let mut peak_commands = 0;

    for frame in 0..FRAME_COUNT {
        camera.position.x += CAMERA_SPEED * FRAME_DT;
        camera.clamp_x(0.0, max_x);
        camera.clamp_y(-60.0, 0.0);
        let camera_position = camera.position;

        queue.clear();
        let mut total = 0;
        for layer in &mut layers {
            let layer_camera = Camera::from_position(camera_position * layer.camera_factor);
            let emitted = renderer.render_scene(&mut layer.scene, &layer_camera, &mut queue);
            log::debug!("layer {}: {} commands", layer.name, emitted);
            total += emitted;
        }
        peak_commands = peak_commands.max(total);

        if frame % 120 == 0 {
            log::info!(
                "frame {frame}: camera x {:.1}, {total} draw commands",
                camera_position.x
            );
        }
    }

    // Full-grid gameplay pass over the ground map: no culling, every tile
    let ground_scene = &mut layers[3].scene;
    let mut tiles = 0;
    ground_scene.map_apply_to_all(ground_map, |scene, index, cell| {
        tiles += 1;
        if index.y == GROUND_ROWS - 1 {
            scene.set_color(cell, Color::rgb(0.4, 0.3, 0.2));
        }
    });
    let map_visible =
        ground_scene.map_is_really_visible(ground_map, &camera, renderer.viewport());

    log::info!(
        "done: {FRAME_COUNT} frames, peak {peak_commands} commands per frame, \
         {tiles} ground tiles touched by the gameplay pass, map visible at end: {map_visible}"
    );

    Ok(())
}
